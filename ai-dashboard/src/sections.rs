use crate::types::Article;
use serde::Serialize;

pub const HEADLINES_SIZE: usize = 2;
pub const INDUSTRY_SIZE: usize = 4;
pub const HIGHLIGHTS_SIZE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Headlines,
    Industry,
    Highlights,
}

impl SectionKind {
    pub const ALL: [SectionKind; 3] = [
        SectionKind::Headlines,
        SectionKind::Industry,
        SectionKind::Highlights,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SectionKind::Headlines => "headlines",
            SectionKind::Industry => "industry",
            SectionKind::Highlights => "highlights",
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            SectionKind::Headlines => "🔥 Headlines",
            SectionKind::Industry => "💼 Industry",
            SectionKind::Highlights => "🧠 Highlights",
        }
    }

    pub fn capacity(&self) -> usize {
        match self {
            SectionKind::Headlines => HEADLINES_SIZE,
            SectionKind::Industry => INDUSTRY_SIZE,
            SectionKind::Highlights => HIGHLIGHTS_SIZE,
        }
    }
}

/// The rendered slices of a run, in rank order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sections {
    pub headlines: Vec<Article>,
    pub industry: Vec<Article>,
    pub highlights: Vec<Article>,
}

impl Sections {
    /// Number of articles the three sections hold together.
    pub const CAPACITY: usize = HEADLINES_SIZE + INDUSTRY_SIZE + HIGHLIGHTS_SIZE;

    /// Split a newest-first list: ranks 1-2 are headlines, 3-6 industry,
    /// 7-8 highlights. Anything past rank 8 is left out.
    pub fn split(articles: &[Article]) -> Self {
        let take = |start: usize, len: usize| -> Vec<Article> {
            articles.iter().skip(start).take(len).cloned().collect()
        };

        Self {
            headlines: take(0, HEADLINES_SIZE),
            industry: take(HEADLINES_SIZE, INDUSTRY_SIZE),
            highlights: take(HEADLINES_SIZE + INDUSTRY_SIZE, HIGHLIGHTS_SIZE),
        }
    }

    pub fn get(&self, kind: SectionKind) -> &[Article] {
        match kind {
            SectionKind::Headlines => &self.headlines,
            SectionKind::Industry => &self.industry,
            SectionKind::Highlights => &self.highlights,
        }
    }

    pub fn get_mut(&mut self, kind: SectionKind) -> &mut Vec<Article> {
        match kind {
            SectionKind::Headlines => &mut self.headlines,
            SectionKind::Industry => &mut self.industry,
            SectionKind::Highlights => &mut self.highlights,
        }
    }

    pub fn len(&self) -> usize {
        self.headlines.len() + self.industry.len() + self.highlights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All articles in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &Article> {
        self.headlines
            .iter()
            .chain(self.industry.iter())
            .chain(self.highlights.iter())
    }
}
