//! The command surface.
//!
//! Every user action arrives as one `AppCommand` and is dispatched to the
//! matching handler; results are serialized to JSON and errors flattened to
//! the warning string the renderer shows. This is the whole boundary between
//! UI wiring and the diary core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    metrics::{self, sort::SortKey},
    models::{Bean, BrewMethod, BrewRecord},
    store::backup,
    App,
};

/// Days covered by the satisfaction line chart.
const TIMELINE_DAYS: usize = 30;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum AppCommand {
    // Records
    SaveRecord { record: BrewRecord },
    UpdateRecord { record: BrewRecord },
    DeleteRecord { date: DateTime<Utc> },
    ListRecords,
    RecordByDate { date: DateTime<Utc> },
    LastRecipe,
    SetSortKey { key: SortKey },
    ToggleSortDirection,

    // Beans
    AddBean { bean: Bean },
    UpdateBean { name: String, bean: Bean },
    DeleteBean { name: String },
    ListBeans,

    // Methods
    AddMethod { method: BrewMethod },
    DeleteMethod { name: String },
    ListMethods,

    // Stats & charts
    Summary,
    Analytics,
    TastingProfiles { beans: Vec<String> },

    // Backup
    ExportBackup,
    ImportBackup { data: String },

    // Drip timer
    ArmTimer { method: String },
    StartTimer,
    PauseTimer,
    ToggleTimer,
    ResetTimer,
    TimerSnapshot,
    TimerPlan,
}

/// One row of the history view: the record plus its roast age.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub record: BrewRecord,
    pub days_since_roast: Option<i64>,
}

impl App {
    /// Route a command to its handler. The `Ok` value is the handler's
    /// result as JSON; the `Err` value is the warning shown to the user.
    pub async fn dispatch(&self, command: AppCommand) -> Result<Value, String> {
        match command {
            AppCommand::SaveRecord { record } => reply(self.save_record(record)),
            AppCommand::UpdateRecord { record } => reply(self.update_record(record)),
            AppCommand::DeleteRecord { date } => reply(self.delete_record(date)),
            AppCommand::ListRecords => encode(&self.history()),
            AppCommand::RecordByDate { date } => encode(&self.store().record(date)),
            AppCommand::LastRecipe => encode(&self.store().latest_record()),
            AppCommand::SetSortKey { key } => {
                self.set_sort_key(key);
                encode(&self.sort_config())
            }
            AppCommand::ToggleSortDirection => {
                self.toggle_sort_direction();
                encode(&self.sort_config())
            }

            AppCommand::AddBean { bean } => reply(self.add_bean(bean)),
            AppCommand::UpdateBean { name, bean } => reply(self.update_bean(&name, bean)),
            AppCommand::DeleteBean { name } => reply(self.store().remove_bean(&name)),
            AppCommand::ListBeans => encode(&self.store().beans()),

            AppCommand::AddMethod { method } => reply(self.add_method(method)),
            AppCommand::DeleteMethod { name } => reply(self.store().remove_method(&name)),
            AppCommand::ListMethods => encode(&self.store().methods()),

            AppCommand::Summary => encode(&self.summary()),
            AppCommand::Analytics => encode(&self.analytics()),
            AppCommand::TastingProfiles { beans } => {
                encode(&metrics::tasting_profiles(&self.store().records(), &beans))
            }

            AppCommand::ExportBackup => {
                reply(backup::export(self.store(), Utc::now()))
            }
            AppCommand::ImportBackup { data } => reply(backup::import(self.store(), &data)),

            AppCommand::ArmTimer { method } => reply(self.arm_timer(&method).await),
            AppCommand::StartTimer => encode(&self.timer().start().await),
            AppCommand::PauseTimer => encode(&self.timer().pause().await),
            AppCommand::ToggleTimer => encode(&self.timer().toggle().await),
            AppCommand::ResetTimer => encode(&self.timer().reset().await),
            AppCommand::TimerSnapshot => encode(&self.timer().snapshot().await),
            AppCommand::TimerPlan => encode(&self.timer().plan().await),
        }
    }

    /// The history view in the configured order, each record annotated with
    /// its days-since-roast.
    pub fn history(&self) -> Vec<HistoryEntry> {
        let mut records = self.store().records();
        let beans = self.store().beans();
        metrics::sort::sort_records(&mut records, self.sort_config(), &beans);

        records
            .into_iter()
            .map(|record| {
                let days_since_roast =
                    metrics::days_since_roast(record.date, &record.recipe.bean_type, &beans);
                HistoryEntry {
                    record,
                    days_since_roast,
                }
            })
            .collect()
    }

    pub fn summary(&self) -> metrics::SummarySnapshot {
        metrics::summary(&self.store().records(), Utc::now().date_naive())
    }

    pub fn analytics(&self) -> metrics::AnalyticsSnapshot {
        let records = self.store().records();
        metrics::AnalyticsSnapshot {
            timeline: metrics::satisfaction_timeline(
                &records,
                Utc::now().date_naive(),
                TIMELINE_DAYS,
            ),
            bean_averages: metrics::satisfaction_by_bean(&records),
            best_recipe: metrics::best_recipe(&records).cloned(),
        }
    }
}

fn reply<T: Serialize>(result: anyhow::Result<T>) -> Result<Value, String> {
    match result {
        Ok(value) => encode(&value),
        Err(err) => Err(err.to_string()),
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BrewDetails, MethodStep, Ratings, Recipe};
    use serde_json::json;
    use tempfile::TempDir;

    fn app(dir: &TempDir) -> App {
        App::new(dir.path().to_path_buf()).unwrap()
    }

    fn record(ts: &str, satisfaction: u8) -> BrewRecord {
        BrewRecord {
            date: ts.parse().unwrap(),
            recipe: Recipe {
                bean_type: "Kenya AA".into(),
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

    #[tokio::test]
    async fn save_and_list_round_trip() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        app.dispatch(AppCommand::SaveRecord {
            record: record("2024-01-01T08:00:00Z", 4),
        })
        .await
        .unwrap();

        let listed = app.dispatch(AppCommand::ListRecords).await.unwrap();
        let entries = listed.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0]["record"]["recipe"]["beanType"],
            json!("Kenya AA")
        );
        // No bean registered, so the roast age is unknown.
        assert_eq!(entries[0]["daysSinceRoast"], Value::Null);
    }

    #[tokio::test]
    async fn invalid_record_surfaces_a_warning_and_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let err = app
            .dispatch(AppCommand::SaveRecord {
                record: record("2024-01-01T08:00:00Z", 0),
            })
            .await
            .unwrap_err();
        assert!(err.contains("satisfaction"));
        assert!(app.store().records().is_empty());
    }

    #[tokio::test]
    async fn commands_deserialize_from_tagged_json() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let command: AppCommand =
            serde_json::from_value(json!({ "command": "toggleSortDirection" })).unwrap();
        let config = app.dispatch(command).await.unwrap();
        assert_eq!(config["direction"], json!("asc"));

        let command: AppCommand = serde_json::from_value(json!({
            "command": "setSortKey",
            "key": "daysSinceRoast",
        }))
        .unwrap();
        let config = app.dispatch(command).await.unwrap();
        assert_eq!(config["key"], json!("daysSinceRoast"));
    }

    #[tokio::test]
    async fn arming_an_unknown_method_reports_not_found() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let armed = app
            .dispatch(AppCommand::ArmTimer {
                method: "missing".into(),
            })
            .await
            .unwrap();
        assert_eq!(armed, json!(false));

        app.dispatch(AppCommand::AddMethod {
            method: BrewMethod {
                name: "4:6".into(),
                steps: vec![MethodStep::bloom(Some(40.0))],
                total_time: 210,
            },
        })
        .await
        .unwrap();

        let armed = app
            .dispatch(AppCommand::ArmTimer {
                method: "4:6".into(),
            })
            .await
            .unwrap();
        assert_eq!(armed, json!(true));

        let snapshot = app.dispatch(AppCommand::TimerSnapshot).await.unwrap();
        assert_eq!(snapshot["status"], json!("idle"));
        assert_eq!(snapshot["clock"], json!("00:00.0"));

        let plan = app.dispatch(AppCommand::TimerPlan).await.unwrap();
        let cues = plan["cues"].as_array().unwrap();
        assert_eq!(cues.len(), 2); // bloom + finish
        assert_eq!(cues[0]["triggerSecs"], json!(0));
        assert_eq!(cues[1]["triggerSecs"], json!(210));
    }

    #[tokio::test]
    async fn best_recipe_flows_through_analytics() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        app.save_record(record("2024-01-01T08:00:00Z", 3)).unwrap();
        app.save_record(record("2024-01-02T08:00:00Z", 5)).unwrap();

        let analytics = app.dispatch(AppCommand::Analytics).await.unwrap();
        assert_eq!(
            analytics["bestRecipe"]["ratings"]["satisfaction"],
            json!(5)
        );
        assert_eq!(analytics["timeline"].as_array().unwrap().len(), 30);
    }
}
