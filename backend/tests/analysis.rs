//! End-to-end runs of the facade over CSV bytes.

use chrono::{TimeZone, Utc};
use rowscope::{Analysis, AnalysisPlan, Step};

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn load(sources: &[(&str, &str)]) -> Analysis {
    let owned: Vec<(String, Vec<u8>)> = sources
        .iter()
        .map(|(name, body)| (name.to_string(), body.as_bytes().to_vec()))
        .collect();

    let mut analysis = Analysis::new();
    let report = analysis.load_sources(&owned);
    assert!(!report.has_failures(), "unexpected failures: {:?}", report.failures);
    analysis
}

#[test]
fn boolean_grouping_keeps_unrecognized_values() {
    let analysis = load(&[("tasks.csv", "id,done\n1,yes\n2,no\n3,bogus\n")]);

    let groups = analysis.group_by_key_boolean("done");

    assert_eq!(groups.truthy.len(), 1);
    assert_eq!(groups.truthy[0]["id"], "1");
    assert_eq!(groups.falsy[0]["id"], "2");
    assert_eq!(groups.undefined[0]["id"], "3");

    // the analyzer drops what grouping keeps as undefined
    let summary = analysis.analyze_boolean_column("done").summary;
    assert_eq!(summary.total, 2);
    assert_eq!(summary.true_percentage, 50.0);
}

#[test]
fn all_empty_row_stays_in_boolean_partition() {
    let analysis = load(&[("tasks.csv", "id,done\n,\n1,yes\n")]);

    assert_eq!(analysis.row_count(), 2);

    let groups = analysis.group_by_key_boolean("done");
    assert_eq!(groups.total(), 2);
    assert_eq!(groups.undefined.len(), 1);
    assert_eq!(groups.undefined[0]["id"], "");
    assert_eq!(groups.truthy[0]["id"], "1");
}

#[test]
fn deduplicate_keeps_first_occurrence() {
    let mut analysis = load(&[("rows.csv", "id,v\n1,a\n1,b\n2,c\n")]);

    analysis.deduplicate(&cols(&["id"]));

    let values: Vec<&str> = analysis.records().iter().filter_map(|r| r["v"].as_str()).collect();
    assert_eq!(values, vec!["a", "c"]);
}

#[test]
fn empty_dates_are_excluded_from_buckets() {
    let now = Utc.with_ymd_and_hms(2024, 6, 11, 12, 0, 0).unwrap();
    let analysis = load(&[("events.csv", "id,created\n1,2024-06-01T12:00:00Z\n2,\n")]);

    let buckets = analysis.analyze_date_column_at("created", now);

    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].category, "10 days since");
    assert_eq!(buckets[0].count, 1);
    assert_eq!(buckets[0].data["daysSince"], 10);
}

#[test]
fn sources_concatenate_in_order_across_delimiters() {
    let mut analysis = load(&[
        ("a.csv", "id,team\n1,red\n2,blue\n"),
        ("b.csv", "id;team\n3;red\n"),
    ]);

    analysis.filter(&cols(&["team"]));
    let groups = analysis.group_by_key("team");

    assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["red", "blue"]);
    let red: Vec<&str> = groups
        .get("red")
        .unwrap_or_default()
        .iter()
        .filter_map(|r| r["id"].as_str())
        .collect();
    assert_eq!(red, vec!["1", "3"]);
}

#[test]
fn plan_from_json_drives_full_run() {
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
    let mut analysis = load(&[(
        "tasks.csv",
        "id,team,done,created,notes\n\
         1,red,yes,2024-03-14,x\n\
         1,red,yes,2024-03-14,dup\n\
         2,blue,no,2024-03-05,y\n\
         3,,yes,2024-03-05,z\n",
    )]);

    let plan = AnalysisPlan::from_json(
        r#"{
            "steps": [
                { "type": "filter", "columns": ["team"] },
                { "type": "dedupe", "columns": ["id"] },
                { "type": "pluck", "columns": ["id", "team", "done", "created"] }
            ],
            "groupBy": ["team", "done"],
            "booleanColumn": "done",
            "dateColumn": "created",
            "includeRecords": false
        }"#,
    )
    .unwrap();
    assert!(matches!(plan.steps[1], Step::Deduplicate { .. }));

    let report = analysis.run_plan_at(&plan, now);

    assert_eq!(report.row_count, 2);
    assert_eq!(report.columns, cols(&["id", "team", "done", "created"]));
    assert!(report.records.is_none());

    let rows: Vec<usize> = report.steps.iter().map(|s| s.rows_after).collect();
    assert_eq!(rows, vec![3, 2, 2]);

    let groups = report.groups.as_ref().unwrap();
    assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["red|yes", "blue|no"]);

    let booleans = report.boolean_analysis.as_ref().unwrap();
    assert_eq!(booleans.summary.true_count, 1);
    assert_eq!(booleans.summary.false_count, 1);

    let categories: Vec<&str> = report
        .date_buckets
        .as_ref()
        .unwrap()
        .iter()
        .map(|b| b.category.as_str())
        .collect();
    assert_eq!(categories, vec!["1 days since", "10 days since"]);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("records").is_none());
    assert!(json.get("booleanGroups").is_none());
    assert_eq!(json["booleanAnalysis"]["summary"]["truePercentage"], 50.0);
}
