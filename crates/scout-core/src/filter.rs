//! Request filters applied by the responding side before it replies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ScoutingEntry, ValidationError};

/// Which matches a request covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchRange {
    /// Every match.
    #[default]
    All,
    /// The last `count` matches, counted back from the highest match number present.
    Last { count: u32 },
    /// Inclusive custom range.
    Custom { start: u32, end: u32 },
}

/// Filters carried by a data request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferFilters {
    #[serde(default)]
    pub match_range: MatchRange,
    /// Team subset; `None` means every team.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<u32>>,
}

/// Records that filters can select on.
pub trait Filterable {
    fn match_number(&self) -> Option<u32>;
    fn team_number(&self) -> Option<u32>;
}

impl Filterable for ScoutingEntry {
    fn match_number(&self) -> Option<u32> {
        Some(self.match_number)
    }

    fn team_number(&self) -> Option<u32> {
        Some(self.team_number)
    }
}

impl Filterable for Value {
    fn match_number(&self) -> Option<u32> {
        self.get("matchNumber")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    }

    fn team_number(&self) -> Option<u32> {
        self.get("teamNumber")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    }
}

impl TransferFilters {
    /// Filters that select everything.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_match_range(mut self, range: MatchRange) -> Self {
        self.match_range = range;
        self
    }

    #[must_use]
    pub fn with_teams(mut self, teams: Vec<u32>) -> Self {
        self.teams = Some(teams);
        self
    }

    /// Whether these filters select everything.
    #[must_use]
    pub const fn is_unfiltered(&self) -> bool {
        matches!(self.match_range, MatchRange::All) && self.teams.is_none()
    }

    /// Reject filters that cannot be applied.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.match_range {
            MatchRange::All => {}
            MatchRange::Last { count } => {
                if count == 0 {
                    return Err(ValidationError::InvalidLastCount);
                }
            }
            MatchRange::Custom { start, end } => {
                if start == 0 || start > end {
                    return Err(ValidationError::InvalidMatchRange { start, end });
                }
            }
        }
        if self.teams.as_ref().is_some_and(Vec::is_empty) {
            return Err(ValidationError::EmptyTeamFilter);
        }
        Ok(())
    }

    /// Keep the records these filters select.
    ///
    /// Records without a match number pass the match-range check; records without a
    /// team number fail an explicit team filter.
    #[must_use]
    pub fn apply<T: Filterable>(&self, records: Vec<T>) -> Vec<T> {
        if self.is_unfiltered() {
            return records;
        }

        let bounds = match self.match_range {
            MatchRange::All => None,
            MatchRange::Custom { start, end } => Some((start, end)),
            // Zero matches back is an empty window.
            MatchRange::Last { count: 0 } => Some((1, 0)),
            MatchRange::Last { count } => records
                .iter()
                .filter_map(Filterable::match_number)
                .max()
                .map(|max| (max.saturating_sub(count).saturating_add(1), max)),
        };

        records
            .into_iter()
            .filter(|record| {
                let in_range = match (bounds, record.match_number()) {
                    (Some((start, end)), Some(n)) => start <= n && n <= end,
                    _ => true,
                };
                let team_ok = self.teams.as_ref().is_none_or(|teams| {
                    record.team_number().is_some_and(|t| teams.contains(&t))
                });
                in_range && team_ok
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<Value> {
        (1..=10)
            .map(|m| json!({"matchNumber": m, "teamNumber": 100 + (m % 3)}))
            .collect()
    }

    #[test]
    fn unfiltered_keeps_everything() {
        assert_eq!(TransferFilters::all().apply(records()).len(), 10);
    }

    #[test]
    fn custom_range_is_inclusive() {
        let filters =
            TransferFilters::all().with_match_range(MatchRange::Custom { start: 3, end: 5 });
        let kept = filters.apply(records());
        let matches: Vec<_> = kept.iter().filter_map(Filterable::match_number).collect();
        assert_eq!(matches, vec![3, 4, 5]);
    }

    #[test]
    fn last_n_counts_back_from_highest_match() {
        let filters = TransferFilters::all().with_match_range(MatchRange::Last { count: 3 });
        let kept = filters.apply(records());
        let matches: Vec<_> = kept.iter().filter_map(Filterable::match_number).collect();
        assert_eq!(matches, vec![8, 9, 10]);
    }

    #[test]
    fn last_n_larger_than_schedule_keeps_all() {
        let filters = TransferFilters::all().with_match_range(MatchRange::Last { count: 50 });
        assert_eq!(filters.apply(records()).len(), 10);
    }

    #[test]
    fn last_zero_selects_no_numbered_matches() {
        let mut records = records();
        records.push(json!({"matchNumber": u32::MAX, "teamNumber": 9}));
        records.push(json!({"teamNumber": 3}));
        let kept = TransferFilters::all()
            .with_match_range(MatchRange::Last { count: 0 })
            .apply(records);
        assert_eq!(kept, vec![json!({"teamNumber": 3})]);
    }

    #[test]
    fn last_n_at_top_of_range() {
        let records = vec![
            json!({"matchNumber": u32::MAX - 1, "teamNumber": 1}),
            json!({"matchNumber": u32::MAX, "teamNumber": 2}),
            json!({"matchNumber": 5, "teamNumber": 3}),
        ];
        let kept = TransferFilters::all()
            .with_match_range(MatchRange::Last { count: 2 })
            .apply(records);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r["matchNumber"].as_u64() >= Some(u64::from(u32::MAX - 1))));
    }

    #[test]
    fn team_subset() {
        let filters = TransferFilters::all().with_teams(vec![101]);
        let kept = filters.apply(records());
        assert!(kept.iter().all(|r| r.team_number() == Some(101)));
        assert_eq!(kept.len(), 4);
    }

    #[test]
    fn records_without_match_number_pass_range() {
        let pit = vec![json!({"teamNumber": 254}), json!({"teamNumber": 1678})];
        let filters = TransferFilters::all()
            .with_match_range(MatchRange::Custom { start: 1, end: 2 })
            .with_teams(vec![254]);
        assert_eq!(filters.apply(pit), vec![json!({"teamNumber": 254})]);
    }

    #[test]
    fn validation() {
        assert!(TransferFilters::all().validate().is_ok());
        assert_eq!(
            TransferFilters::all()
                .with_match_range(MatchRange::Custom { start: 9, end: 3 })
                .validate(),
            Err(ValidationError::InvalidMatchRange { start: 9, end: 3 })
        );
        assert_eq!(
            TransferFilters::all()
                .with_match_range(MatchRange::Custom { start: 0, end: 3 })
                .validate(),
            Err(ValidationError::InvalidMatchRange { start: 0, end: 3 })
        );
        assert_eq!(
            TransferFilters::all()
                .with_match_range(MatchRange::Last { count: 0 })
                .validate(),
            Err(ValidationError::InvalidLastCount)
        );
        assert_eq!(
            TransferFilters::all().with_teams(vec![]).validate(),
            Err(ValidationError::EmptyTeamFilter)
        );
    }

    #[test]
    fn wire_shape() {
        let filters = TransferFilters::all()
            .with_match_range(MatchRange::Custom { start: 1, end: 12 })
            .with_teams(vec![1234]);
        assert_eq!(
            serde_json::to_value(&filters).unwrap(),
            json!({"matchRange": {"custom": {"start": 1, "end": 12}}, "teams": [1234]})
        );
        let parsed: TransferFilters = serde_json::from_value(json!({})).unwrap();
        assert!(parsed.is_unfiltered());
        let parsed: TransferFilters = serde_json::from_value(json!({"matchRange": "all"})).unwrap();
        assert_eq!(parsed.match_range, MatchRange::All);
    }
}
