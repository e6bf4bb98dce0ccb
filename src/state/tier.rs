/// Priority tiers used to decide how often a page is re-polled
///
/// This module defines the three tiers and the partition of visited pages
/// into them.
use crate::crawler::PageId;
use std::collections::HashMap;
use std::fmt;

/// Monitoring priority of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PriorityTier {
    /// Most important pages, polled most often
    High,

    /// Default tier
    Medium,

    /// Least important pages, polled least often
    Low,
}

impl PriorityTier {
    /// Converts the tier to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Parses a tier from its database string representation
    ///
    /// Returns None if the string doesn't match any known tier.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Returns all tiers, highest priority first
    pub fn all() -> [Self; 3] {
        [Self::High, Self::Medium, Self::Low]
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// Partition of the visited pages into the three tiers
///
/// Each page appears in exactly one tier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierAssignment {
    high: Vec<PageId>,
    medium: Vec<PageId>,
    low: Vec<PageId>,
}

impl TierAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a page to a tier
    ///
    /// Callers are responsible for assigning each page only once.
    pub fn push(&mut self, tier: PriorityTier, page_id: PageId) {
        match tier {
            PriorityTier::High => self.high.push(page_id),
            PriorityTier::Medium => self.medium.push(page_id),
            PriorityTier::Low => self.low.push(page_id),
        }
    }

    /// Pages assigned to a tier
    pub fn pages(&self, tier: PriorityTier) -> &[PageId] {
        match tier {
            PriorityTier::High => &self.high,
            PriorityTier::Medium => &self.medium,
            PriorityTier::Low => &self.low,
        }
    }

    /// Looks up the tier of a page
    pub fn tier_of(&self, page_id: &str) -> Option<PriorityTier> {
        PriorityTier::all()
            .into_iter()
            .find(|tier| self.pages(*tier).iter().any(|p| p == page_id))
    }

    /// Page -> tier lookup table
    pub fn by_page(&self) -> HashMap<&str, PriorityTier> {
        PriorityTier::all()
            .into_iter()
            .flat_map(|tier| self.pages(tier).iter().map(move |p| (p.as_str(), tier)))
            .collect()
    }

    /// Number of pages per tier, as (high, medium, low)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.high.len(), self.medium.len(), self.low.len())
    }

    /// Total number of assigned pages
    pub fn len(&self) -> usize {
        self.high.len() + self.medium.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_string_roundtrip() {
        for tier in PriorityTier::all() {
            assert_eq!(PriorityTier::from_db_string(tier.to_db_string()), Some(tier));
        }
        assert_eq!(PriorityTier::from_db_string("urgent"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(PriorityTier::High.to_string(), "high");
        assert_eq!(PriorityTier::Low.to_string(), "low");
    }

    #[test]
    fn test_push_and_lookup() {
        let mut tiers = TierAssignment::new();
        tiers.push(PriorityTier::High, "a".to_string());
        tiers.push(PriorityTier::Low, "b".to_string());
        tiers.push(PriorityTier::Low, "c".to_string());

        assert_eq!(tiers.counts(), (1, 0, 2));
        assert_eq!(tiers.len(), 3);
        assert_eq!(tiers.tier_of("b"), Some(PriorityTier::Low));
        assert_eq!(tiers.tier_of("zzz"), None);
        assert_eq!(tiers.by_page().get("a"), Some(&PriorityTier::High));
    }

    #[test]
    fn test_empty_assignment() {
        let tiers = TierAssignment::new();
        assert!(tiers.is_empty());
        assert!(tiers.pages(PriorityTier::Medium).is_empty());
    }
}
