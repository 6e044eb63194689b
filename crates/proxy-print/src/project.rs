//! Keeping a job's card list in step with the image root

use crate::cache::list_images;
use crate::options::{CardEntry, PrintJob};
use crate::types::Result;
use std::collections::BTreeSet;

/// Changes made by a scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Cards whose backside override pointed at a missing file
    pub reset_backsides: Vec<String>,
}

/// Scan the job's image root: add an entry for every new image, drop
/// entries whose image is gone, and clear backside overrides that point at
/// missing files.
pub fn scan_images(job: &mut PrintJob) -> Result<ScanReport> {
    std::fs::create_dir_all(&job.image_dir)?;
    let names: BTreeSet<String> = list_images(&job.image_dir)?.into_iter().collect();
    let mut report = ScanReport::default();

    for name in &names {
        if !job.cards.contains_key(name) {
            job.cards.insert(name.clone(), CardEntry::discovered(name));
            report.added.push(name.clone());
        }
    }

    job.cards.retain(|name, _| {
        let keep = names.contains(name);
        if !keep {
            report.removed.push(name.clone());
        }
        keep
    });

    for (name, entry) in job.cards.iter_mut() {
        if entry.backside.as_ref().is_some_and(|b| !names.contains(b)) {
            entry.backside = None;
            report.reset_backsides.push(name.clone());
        }
    }

    if !report.added.is_empty() || !report.removed.is_empty() {
        log::info!(
            "Scanned {}: {} new, {} removed",
            job.image_dir.display(),
            report.added.len(),
            report.removed.len()
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &std::path::Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_scan_adds_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "bolt.png");
        touch(dir.path(), "__back.png");
        touch(dir.path(), "notes.txt");

        let mut job = PrintJob {
            image_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        job.cards.insert("gone.png".into(), CardEntry::discovered("gone.png"));
        job.cards.insert(
            "bolt.png".into(),
            CardEntry {
                copies: 4,
                backside: Some("missing.png".into()),
                ..Default::default()
            },
        );

        let report = scan_images(&mut job).unwrap();
        assert_eq!(report.added, vec!["__back.png".to_string()]);
        assert_eq!(report.removed, vec!["gone.png".to_string()]);
        assert_eq!(report.reset_backsides, vec!["bolt.png".to_string()]);

        // Existing entries keep their settings
        assert_eq!(job.cards["bolt.png"].copies, 4);
        assert!(job.cards["bolt.png"].backside.is_none());

        let back = &job.cards["__back.png"];
        assert!(back.hidden);
        assert_eq!(back.copies, 0);
        assert!(!job.cards.contains_key("notes.txt"));
    }

    #[test]
    fn test_crop_dir_is_not_a_card() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("crop")).unwrap();
        touch(&dir.path().join("crop"), "a.png");

        let mut job = PrintJob {
            image_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let report = scan_images(&mut job).unwrap();
        assert!(report.added.is_empty());
        assert!(job.cards.is_empty());
    }
}
