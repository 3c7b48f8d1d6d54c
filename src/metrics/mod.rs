//! Derived diary metrics.
//!
//! Pure functions over the record and bean collections, re-run after every
//! mutation. Everything takes `today` (or the full timestamp) as an argument;
//! callers pass the current instant.

pub mod sort;

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::models::{Bean, BrewRecord};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Header stats: today's brews, today's mean satisfaction, and the streak.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummarySnapshot {
    pub today_count: usize,
    pub today_average: Option<f64>,
    pub streak_days: u32,
}

/// Mean satisfaction for one bean, in first-brewed order.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BeanAverage {
    pub bean: String,
    pub brews: usize,
    pub average: f64,
}

/// One day of the satisfaction line chart. `average` is absent on days
/// without brews.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailySatisfaction {
    pub date: NaiveDate,
    pub average: Option<f64>,
}

/// The six radar axes of one rated brew.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TastingProfile {
    pub date: DateTime<Utc>,
    pub bean_type: String,
    pub aroma: u8,
    pub acidity: u8,
    pub sweetness: u8,
    pub bitterness: u8,
    pub body: u8,
    pub aftertaste: u8,
}

/// Everything the analytics tab renders in one pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub timeline: Vec<DailySatisfaction>,
    pub bean_averages: Vec<BeanAverage>,
    pub best_recipe: Option<BrewRecord>,
}

/// Count consecutive brewing days ending at (or adjacent to) `today`.
///
/// The most recent brew date anchors the streak: more than one day in the
/// past and the streak is broken; today or yesterday starts it at 1. From
/// there the scan walks backward through the distinct brew dates and stops at
/// the first gap wider than one day. A most-recent date in the future leaves
/// the anchor unset while the scan still runs; that quirk is long-standing
/// behavior and is kept as is.
pub fn streak_days(records: &[BrewRecord], today: NaiveDate) -> u32 {
    let mut dates: Vec<NaiveDate> = records.iter().map(|r| r.date.date_naive()).collect();
    dates.sort_unstable();
    dates.dedup();
    dates.reverse();

    let Some(&latest) = dates.first() else {
        return 0;
    };

    let anchor_gap = (today - latest).num_days();
    if anchor_gap > 1 {
        return 0;
    }
    let mut streak = if anchor_gap == 0 || anchor_gap == 1 { 1 } else { 0 };

    for pair in dates.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Whole days between a brew and its bean's roast date, rounded up.
///
/// Returns `None` when the bean is missing or its roast date is unknown.
/// The difference is taken as an absolute value, so the result is never
/// negative; a brew within 24h of the roast reports 1, or 0 only when the
/// two instants coincide exactly.
pub fn days_since_roast(
    brew_date: DateTime<Utc>,
    bean_name: &str,
    beans: &[Bean],
) -> Option<i64> {
    let bean = beans.iter().find(|b| b.name == bean_name)?;
    let roast = bean.roast_date.as_date()?;
    let roast_midnight = roast.and_time(NaiveTime::MIN).and_utc();

    let diff_ms = (brew_date - roast_midnight).num_milliseconds().abs();
    Some((diff_ms + MS_PER_DAY - 1) / MS_PER_DAY)
}

/// Highest-satisfaction record among those rated 4 or better. Ties go to the
/// record encountered first in the input.
pub fn best_recipe(records: &[BrewRecord]) -> Option<&BrewRecord> {
    records
        .iter()
        .filter(|r| r.ratings.satisfaction >= 4)
        .fold(None, |best: Option<&BrewRecord>, candidate| match best {
            Some(current) if candidate.ratings.satisfaction > current.ratings.satisfaction => {
                Some(candidate)
            }
            None => Some(candidate),
            _ => best,
        })
}

/// Mean satisfaction per bean, in order of first appearance. Records without
/// a bean reference are skipped; beans with no qualifying records are absent.
pub fn satisfaction_by_bean(records: &[BrewRecord]) -> Vec<BeanAverage> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, (usize, u32)> = HashMap::new();

    for record in records {
        let bean = record.recipe.bean_type.as_str();
        if bean.is_empty() {
            continue;
        }
        let entry = totals.entry(bean).or_insert_with(|| {
            order.push(bean);
            (0, 0)
        });
        entry.0 += 1;
        entry.1 += u32::from(record.ratings.satisfaction);
    }

    order
        .into_iter()
        .map(|bean| {
            let (brews, total) = totals[bean];
            BeanAverage {
                bean: bean.to_string(),
                brews,
                average: f64::from(total) / brews as f64,
            }
        })
        .collect()
}

pub fn summary(records: &[BrewRecord], today: NaiveDate) -> SummarySnapshot {
    let today_scores: Vec<u32> = records
        .iter()
        .filter(|r| r.date.date_naive() == today)
        .map(|r| u32::from(r.ratings.satisfaction))
        .collect();

    let today_average = if today_scores.is_empty() {
        None
    } else {
        Some(f64::from(today_scores.iter().sum::<u32>()) / today_scores.len() as f64)
    };

    SummarySnapshot {
        today_count: today_scores.len(),
        today_average,
        streak_days: streak_days(records, today),
    }
}

/// Daily mean satisfaction over the trailing `days` window, oldest first.
/// The window always ends on `today` and has exactly `days` entries.
pub fn satisfaction_timeline(
    records: &[BrewRecord],
    today: NaiveDate,
    days: usize,
) -> Vec<DailySatisfaction> {
    (0..days)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset as i64);
            let scores: Vec<u32> = records
                .iter()
                .filter(|r| r.date.date_naive() == date)
                .map(|r| u32::from(r.ratings.satisfaction))
                .collect();
            let average = if scores.is_empty() {
                None
            } else {
                Some(f64::from(scores.iter().sum::<u32>()) / scores.len() as f64)
            };
            DailySatisfaction { date, average }
        })
        .collect()
}

/// Radar-chart data: brews of the selected beans that carry tasting notes,
/// newest first.
pub fn tasting_profiles(records: &[BrewRecord], selected_beans: &[String]) -> Vec<TastingProfile> {
    let mut rated: Vec<&BrewRecord> = records
        .iter()
        .filter(|r| selected_beans.contains(&r.recipe.bean_type) && r.has_tasting_notes())
        .collect();
    rated.sort_by(|a, b| b.date.cmp(&a.date));

    rated
        .into_iter()
        .map(|r| TastingProfile {
            date: r.date,
            bean_type: r.recipe.bean_type.clone(),
            aroma: r.ratings.aroma,
            acidity: r.ratings.acidity,
            sweetness: r.ratings.sweetness,
            bitterness: r.ratings.bitterness,
            body: r.ratings.body,
            aftertaste: r.ratings.aftertaste,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BrewDetails, Ratings, Recipe, RoastDate};

    fn record(ts: &str, bean: &str, satisfaction: u8) -> BrewRecord {
        BrewRecord {
            date: ts.parse().unwrap(),
            recipe: Recipe {
                bean_type: bean.into(),
                bean_weight: 15.0,
                brew_ratio: 16.0,
                grind_size: "medium".into(),
                dripper: "V60".into(),
                water_weight: 240.0,
                water_temperature: 92,
                extraction_method: "4:6".into(),
            },
            details: BrewDetails::default(),
            ratings: Ratings {
                satisfaction,
                ..Ratings::default()
            },
        }
    }

    fn bean(name: &str, roast_date: RoastDate) -> Bean {
        Bean {
            name: name.into(),
            url: String::new(),
            store_name: String::new(),
            store_url: String::new(),
            roast_level: "City".into(),
            roast_date,
            purchase_type: String::new(),
            price: None,
            weight: None,
            purchase_date: String::new(),
        }
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn streak_is_zero_without_records() {
        assert_eq!(streak_days(&[], day("2024-01-02")), 0);
    }

    #[test]
    fn streak_counts_today_and_yesterday() {
        let records = vec![
            record("2024-01-01T08:00:00Z", "Kenya AA", 5),
            record("2024-01-02T08:00:00Z", "Kenya AA", 3),
        ];
        assert_eq!(streak_days(&records, day("2024-01-02")), 2);
    }

    #[test]
    fn streak_survives_a_quiet_today_when_yesterday_has_a_brew() {
        let records = vec![
            record("2023-12-31T07:00:00Z", "Kenya AA", 4),
            record("2024-01-01T08:00:00Z", "Kenya AA", 5),
        ];
        assert_eq!(streak_days(&records, day("2024-01-02")), 2);
    }

    #[test]
    fn streak_breaks_when_the_latest_brew_is_too_old() {
        let records = vec![record("2024-01-01T08:00:00Z", "Kenya AA", 5)];
        assert_eq!(streak_days(&records, day("2024-01-03")), 0);
    }

    #[test]
    fn gap_caps_the_streak_at_the_trailing_run() {
        let records = vec![
            record("2024-01-01T08:00:00Z", "Kenya AA", 4),
            record("2024-01-02T08:00:00Z", "Kenya AA", 4),
            // gap: no brew on the 3rd
            record("2024-01-04T08:00:00Z", "Kenya AA", 4),
            record("2024-01-05T08:00:00Z", "Kenya AA", 4),
        ];
        assert_eq!(streak_days(&records, day("2024-01-05")), 2);
    }

    #[test]
    fn multiple_brews_per_day_count_once() {
        let records = vec![
            record("2024-01-01T08:00:00Z", "Kenya AA", 4),
            record("2024-01-01T16:00:00Z", "Kenya AA", 3),
            record("2024-01-02T08:00:00Z", "Kenya AA", 4),
        ];
        assert_eq!(streak_days(&records, day("2024-01-02")), 2);
    }

    #[test]
    fn days_since_roast_rounds_up() {
        let beans = vec![bean("Kenya AA", RoastDate::Known(day("2024-03-10")))];

        // Two hours after the roast-day midnight: ceiling says 1.
        let brew: DateTime<Utc> = "2024-03-10T02:00:00Z".parse().unwrap();
        assert_eq!(days_since_roast(brew, "Kenya AA", &beans), Some(1));

        // Exactly at the roast-day midnight: 0.
        let brew: DateTime<Utc> = "2024-03-10T00:00:00Z".parse().unwrap();
        assert_eq!(days_since_roast(brew, "Kenya AA", &beans), Some(0));

        // A week and a bit: 8 days.
        let brew: DateTime<Utc> = "2024-03-17T06:00:00Z".parse().unwrap();
        assert_eq!(days_since_roast(brew, "Kenya AA", &beans), Some(8));
    }

    #[test]
    fn days_since_roast_is_never_negative() {
        // Roast date recorded after the brew (data entry quirk): still >= 0.
        let beans = vec![bean("Kenya AA", RoastDate::Known(day("2024-03-20")))];
        let brew: DateTime<Utc> = "2024-03-18T10:00:00Z".parse().unwrap();
        let days = days_since_roast(brew, "Kenya AA", &beans).unwrap();
        assert!(days >= 0);
        assert_eq!(days, 2);
    }

    #[test]
    fn days_since_roast_handles_lookup_misses() {
        let beans = vec![bean("Kenya AA", RoastDate::Unknown)];
        let brew: DateTime<Utc> = "2024-03-10T02:00:00Z".parse().unwrap();
        assert_eq!(days_since_roast(brew, "Kenya AA", &beans), None);
        assert_eq!(days_since_roast(brew, "Missing Bean", &beans), None);
    }

    #[test]
    fn best_recipe_requires_satisfaction_four_or_better() {
        let records = vec![
            record("2024-01-01T08:00:00Z", "Kenya AA", 3),
            record("2024-01-02T08:00:00Z", "Brazil Santos", 2),
        ];
        assert!(best_recipe(&records).is_none());
    }

    #[test]
    fn best_recipe_ties_go_to_the_first_encountered() {
        let records = vec![
            record("2024-01-01T08:00:00Z", "Kenya AA", 5),
            record("2024-01-02T08:00:00Z", "Brazil Santos", 5),
            record("2024-01-03T08:00:00Z", "Ethiopia", 4),
        ];
        let best = best_recipe(&records).unwrap();
        assert_eq!(best.recipe.bean_type, "Kenya AA");
    }

    #[test]
    fn bean_averages_follow_first_appearance_order() {
        let records = vec![
            record("2024-01-01T08:00:00Z", "Kenya AA", 5),
            record("2024-01-02T08:00:00Z", "Brazil Santos", 2),
            record("2024-01-03T08:00:00Z", "Kenya AA", 4),
            record("2024-01-04T08:00:00Z", "", 5), // no bean reference
        ];
        let averages = satisfaction_by_bean(&records);
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].bean, "Kenya AA");
        assert_eq!(averages[0].brews, 2);
        assert!((averages[0].average - 4.5).abs() < f64::EPSILON);
        assert_eq!(averages[1].bean, "Brazil Santos");
        assert!((averages[1].average - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_reports_today_only() {
        let records = vec![
            record("2024-01-01T08:00:00Z", "Kenya AA", 5),
            record("2024-01-02T08:00:00Z", "Kenya AA", 3),
            record("2024-01-02T16:00:00Z", "Kenya AA", 4),
        ];
        let snapshot = summary(&records, day("2024-01-02"));
        assert_eq!(snapshot.today_count, 2);
        assert!((snapshot.today_average.unwrap() - 3.5).abs() < f64::EPSILON);
        assert_eq!(snapshot.streak_days, 2);

        let quiet = summary(&records, day("2024-01-03"));
        assert_eq!(quiet.today_count, 0);
        assert_eq!(quiet.today_average, None);
    }

    #[test]
    fn timeline_has_one_entry_per_day_ending_today() {
        let records = vec![
            record("2024-01-09T08:00:00Z", "Kenya AA", 4),
            record("2024-01-10T08:00:00Z", "Kenya AA", 2),
            record("2024-01-10T18:00:00Z", "Kenya AA", 4),
        ];
        let timeline = satisfaction_timeline(&records, day("2024-01-10"), 7);
        assert_eq!(timeline.len(), 7);
        assert_eq!(timeline[0].date, day("2024-01-04"));
        assert_eq!(timeline[6].date, day("2024-01-10"));
        assert_eq!(timeline[5].average, Some(4.0));
        assert_eq!(timeline[6].average, Some(3.0));
        assert_eq!(timeline[0].average, None);
    }

    #[test]
    fn tasting_profiles_filter_and_sort_newest_first() {
        let mut rated = record("2024-01-01T08:00:00Z", "Kenya AA", 4);
        rated.ratings.aroma = 3;
        let mut newer = record("2024-01-02T08:00:00Z", "Kenya AA", 4);
        newer.ratings.aroma = 5;
        let unrated = record("2024-01-03T08:00:00Z", "Kenya AA", 4);
        let other_bean = {
            let mut r = record("2024-01-04T08:00:00Z", "Brazil Santos", 4);
            r.ratings.aroma = 4;
            r
        };

        let records = vec![rated, newer, unrated, other_bean];
        let profiles = tasting_profiles(&records, &["Kenya AA".to_string()]);
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].aroma, 5);
        assert_eq!(profiles[1].aroma, 3);
    }
}
