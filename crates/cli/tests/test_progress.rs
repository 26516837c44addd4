use cli::progress::ProgressType;
use std::time::Duration;

#[test]
fn test_progress_type_configs() {
    assert_eq!(ProgressType::Catalog.tick_interval(), Duration::from_millis(80));
    assert_eq!(ProgressType::Catalog.color(), "cyan");

    assert_eq!(ProgressType::Upload.color(), "blue");

    assert_eq!(ProgressType::Analysis.tick_interval(), Duration::from_millis(150));
    assert_eq!(ProgressType::Analysis.color(), "yellow");

    assert_eq!(ProgressType::Assistant.color(), "magenta");
}

#[test]
fn test_catalog_then_analysis_phases() {
    let loading = ProgressType::Catalog.create_spinner("Loading catalog...");
    loading.finish_and_clear();
    assert!(loading.is_finished());

    let analysis = ProgressType::Analysis.create_spinner("Comparing with reference photos...");
    assert!(!analysis.is_finished());
    analysis.finish_error("Analysis failed");
    assert!(analysis.is_finished());
}

#[test]
fn test_spinner_success_and_drop() {
    let spinner = ProgressType::Assistant.create_spinner("Thinking...");
    spinner.set_message("Still thinking...");
    spinner.finish_success("Done");
    assert!(spinner.is_finished());

    // dropping an unfinished spinner clears it without panicking
    let _unfinished = ProgressType::Upload.create_spinner("Uploading...");
}
