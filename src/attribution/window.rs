use crate::models::CampaignWindow;

/// Milliseconds in one day.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Campaign set for repeated point-in-time lookups.
///
/// Indices returned by lookups refer to the campaign order the set was
/// built from. Inverted windows (`start > end`) keep their index but
/// never match.
#[derive(Debug, Clone, Copy)]
pub struct ActiveWindows<'a> {
    campaigns: &'a [CampaignWindow],
}

impl<'a> ActiveWindows<'a> {
    pub fn new(campaigns: &'a [CampaignWindow]) -> Self {
        Self { campaigns }
    }

    /// Fill `out` with the indices of every campaign active at `timestamp_ms`.
    pub fn active_at(&self, timestamp_ms: i64, out: &mut Vec<usize>) {
        out.clear();
        out.extend(
            self.campaigns
                .iter()
                .enumerate()
                .filter(|(_, c)| c.contains(timestamp_ms))
                .map(|(idx, _)| idx),
        );
    }
}

/// Indices of the campaigns whose window contains `timestamp_ms`.
pub fn active_campaigns(campaigns: &[CampaignWindow], timestamp_ms: i64) -> Vec<usize> {
    let mut out = Vec::new();
    ActiveWindows::new(campaigns).active_at(timestamp_ms, &mut out);
    out
}

/// Length of a campaign in days, never below one.
pub fn duration_days(campaign: &CampaignWindow) -> f64 {
    let days = (campaign.end_ms() - campaign.start_ms()) as f64 / DAY_MS as f64;
    days.max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn campaign(id: &str, start_day: u32, end_day: u32) -> CampaignWindow {
        CampaignWindow {
            id: id.into(),
            start_date: Utc.with_ymd_and_hms(2024, 1, start_day, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 1, end_day, 0, 0, 0).unwrap(),
            budget_usd: 100.0,
            channel: "twitter".into(),
        }
    }

    fn day(d: u32) -> i64 {
        Utc.with_ymd_and_hms(2024, 1, d, 12, 0, 0).unwrap().timestamp_millis()
    }

    #[test]
    fn test_overlapping_windows() {
        let campaigns = vec![campaign("A", 1, 10), campaign("B", 5, 20), campaign("C", 15, 25)];

        assert_eq!(active_campaigns(&campaigns, day(2)), vec![0]);
        assert_eq!(active_campaigns(&campaigns, day(7)), vec![0, 1]);
        assert_eq!(active_campaigns(&campaigns, day(16)), vec![1, 2]);
        assert!(active_campaigns(&campaigns, day(28)).is_empty());
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let campaigns = vec![campaign("A", 1, 10)];
        let start = campaigns[0].start_ms();
        let end = campaigns[0].end_ms();

        assert_eq!(active_campaigns(&campaigns, start), vec![0]);
        assert_eq!(active_campaigns(&campaigns, end), vec![0]);
        assert!(active_campaigns(&campaigns, end + 1).is_empty());
    }

    #[test]
    fn test_inverted_window_never_active() {
        let campaigns = vec![campaign("bad", 10, 1), campaign("ok", 1, 10)];
        assert_eq!(active_campaigns(&campaigns, day(5)), vec![1]);
        assert_eq!(active_campaigns(&campaigns, day(9)), vec![1]);
    }

    #[test]
    fn test_duration_days_floor() {
        assert_eq!(duration_days(&campaign("A", 1, 10)), 9.0);
        assert_eq!(duration_days(&campaign("same", 3, 3)), 1.0);
        assert_eq!(duration_days(&campaign("inverted", 10, 1)), 1.0);
    }
}
