use super::*;
use crate::{
    foundation::color::BarColor,
    handlers::progress_bar::ProgressBarPainter,
    test_support::{scratch, write_solid_gif},
};

fn populate(root: &Path) {
    write_solid_gif(&root.join("a.gif"), 8, 8, 2);
    write_solid_gif(&root.join("b.GIF"), 8, 8, 3);
    write_solid_gif(&root.join("c.gif"), 8, 8, 1);
    write_solid_gif(&root.join("_done.gif"), 8, 8, 2);
    std::fs::write(root.join("notes.txt"), b"ignore me").unwrap();
    std::fs::create_dir_all(root.join("nested.gif")).unwrap();
}

fn chain() -> HandlerChain {
    HandlerChain::new().with(ProgressBarPainter::new(BarColor::RED))
}

#[test]
fn enumeration_skips_prefixed_and_foreign_entries() {
    let root = scratch("batch_enum");
    populate(&root);

    let sources = eligible_sources(&root, &RunConfig::default()).unwrap();
    let names: Vec<String> = sources
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.gif", "b.GIF", "c.gif"]);

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn processes_exactly_the_eligible_files() {
    let root = scratch("batch_run");
    populate(&root);

    let config = RunConfig::default();
    let handlers = chain();
    let report = BatchRunner::new(&root, &config, &handlers).run().unwrap();
    assert!(report.is_success());
    assert_eq!(report.processed.len(), 3);
    assert!(root.join("_a.gif").exists());
    assert!(root.join("_b.GIF").exists());
    assert!(root.join("_c.gif").exists());
    assert!(!root.join("__done.gif").exists());

    // A second run only sees the same three sources again, never the outputs.
    let again = BatchRunner::new(&root, &config, &handlers).run().unwrap();
    assert_eq!(again.total(), 3);
    assert!(!root.join("__a.gif").exists());

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn per_file_failures_do_not_stop_the_batch() {
    let root = scratch("batch_isolation");
    write_solid_gif(&root.join("good1.gif"), 8, 8, 2);
    std::fs::write(root.join("broken.gif"), b"nope").unwrap();
    write_solid_gif(&root.join("good2.gif"), 8, 8, 2);

    let config = RunConfig::default();
    let handlers = chain();
    let report = BatchRunner::new(&root, &config, &handlers).run().unwrap();
    assert_eq!(report.processed.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].source.ends_with("broken.gif"));
    assert!(!report.is_success());
    assert!(!root.join("_broken.gif").exists());

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn empty_chain_aborts_before_any_file() {
    let root = scratch("batch_nohandlers");
    populate(&root);

    let config = RunConfig::default();
    let handlers = HandlerChain::new();
    let err = BatchRunner::new(&root, &config, &handlers).run().unwrap_err();
    assert!(matches!(err, GifbarError::Config(_)));
    assert!(!root.join("_a.gif").exists());

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn parallel_batch_matches_sequential_outcome() {
    let root = scratch("batch_parallel");
    for i in 0..6 {
        write_solid_gif(&root.join(format!("p{i}.gif")), 10, 6, 3);
    }

    let config = RunConfig {
        parallel: true,
        threads: Some(3),
        storage: crate::store::frames::StorageMode::Disk,
        ..RunConfig::default()
    };
    let handlers = chain();
    let report = BatchRunner::new(&root, &config, &handlers).run().unwrap();
    assert_eq!(report.processed.len(), 6);
    for i in 0..6 {
        assert!(root.join(format!("_p{i}.gif")).exists());
        assert!(!root.join(format!(".p{i}.gif.frames")).exists());
    }

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn missing_directory_is_an_error() {
    let config = RunConfig::default();
    let handlers = chain();
    assert!(
        BatchRunner::new("no/such/dir", &config, &handlers)
            .run()
            .is_err()
    );
}
