use otu_cluster_tools::otu::accuracy::evaluate;
use otu_cluster_tools::otu::MockEvaluation;
use std::fs;
use tempfile::tempdir;

#[test]
fn mock_column_is_summarized() {
    let dir = tempdir().unwrap();
    let table = dir.path().join("out.EE1.0.otu_table.txt");
    fs::write(
        &table,
        "OTUId\tMockBC\nOTU_1\t0\nPs_aeruginosa\t150\nOTU_2\t30\n",
    )
    .unwrap();

    let MockEvaluation::Evaluated(summary) = evaluate(&table, "MockBC", Some(3)).unwrap() else {
        panic!("MockBC is a column of the table");
    };
    assert_eq!(summary.num_otus, 2);
    assert_eq!(summary.mock_found, 1);
    assert_eq!(summary.spurious, 1);
    assert_eq!(summary.good_otu, vec![150]);
    assert_eq!(summary.bad_otu, vec![30]);
    assert_eq!(summary.num_otus, summary.mock_found + summary.spurious);

    let report = summary.report_lines();
    assert!(report.contains(&"Range of counts from Real OTUs:  150 - 150".to_string()));
    assert!(report.contains(&"Highest count from Spurious OTUs:  30".to_string()));
}

#[test]
fn other_samples_do_not_leak_into_the_mock() {
    let dir = tempdir().unwrap();
    let table = dir.path().join("otu_table.txt");
    fs::write(
        &table,
        "OTUId\tSampleA\tMockBC\tSampleB\nOTU_1\t900\t0\t12\nE_coli\t0\t44\t0\nOTU_7\t5\t2\t0\n",
    )
    .unwrap();

    let MockEvaluation::Evaluated(summary) = evaluate(&table, "MockBC", None).unwrap() else {
        panic!("MockBC is a column of the table");
    };
    assert_eq!(summary.num_otus, 2);
    assert_eq!(summary.good_otu, vec![44]);
    assert_eq!(summary.bad_otu, vec![2]);
}

#[test]
fn absent_mock_label_is_not_applicable() {
    let dir = tempdir().unwrap();
    let table = dir.path().join("otu_table.txt");
    fs::write(&table, "OTUId\tSampleA\nOTU_1\t4\n").unwrap();

    assert_eq!(
        evaluate(&table, "MockBC", None).unwrap(),
        MockEvaluation::NotApplicable {
            mock_label: "MockBC".to_string()
        }
    );
}

#[test]
fn summary_serializes_with_status_tag() {
    let dir = tempdir().unwrap();
    let table = dir.path().join("otu_table.txt");
    fs::write(&table, "OTUId\tMockBC\nB_subtilis\t8\n").unwrap();

    let evaluation = evaluate(&table, "MockBC", Some(1)).unwrap();
    let json: serde_json::Value = serde_json::to_value(&evaluation).unwrap();
    assert_eq!(json["status"], "evaluated");
    assert_eq!(json["mock_found"], 1);
    assert_eq!(json["theoretical"], 1);
}
