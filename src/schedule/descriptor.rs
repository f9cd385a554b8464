//! launchd job descriptor codec.
//!
//! Reads and writes the property-list file describing the recurring
//! collection job. The typed fields this tool manages are `Label`,
//! `ProgramArguments`, `StartCalendarInterval`, `StandardOutPath`, and
//! `StandardErrorPath`; every other top-level key is carried through a
//! load → save cycle untouched, since the file is shared surface with the OS.
//!
//! launchd's calendar-interval quirk: a job with exactly one firing time
//! stores a single `{Hour, Minute}` dictionary, while multiple firing times
//! store an array of them. Both shapes are accepted on read and the matching
//! shape is produced on write.

use crate::error::{Result, TrackError};
use crate::schedule::trigger::Trigger;
use std::path::Path;

/// The recurring job as persisted in the agents directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    /// launchd job label.
    pub label: String,
    /// Command and arguments the job runs.
    pub program_arguments: Vec<String>,
    /// Daily firing times. Sorted ascending on save.
    pub triggers: Vec<Trigger>,
    /// Stdout log path for scheduled runs.
    pub stdout_path: Option<String>,
    /// Stderr log path for scheduled runs.
    pub stderr_path: Option<String>,
    /// Top-level keys this tool does not manage, preserved across rewrites.
    extra: plist::Dictionary,
}

impl Descriptor {
    /// Build a fresh descriptor with no triggers and no log paths.
    #[must_use]
    pub fn new(label: impl Into<String>, program_arguments: Vec<String>) -> Self {
        Self {
            label: label.into(),
            program_arguments,
            triggers: Vec::new(),
            stdout_path: None,
            stderr_path: None,
            extra: plist::Dictionary::new(),
        }
    }

    /// Read the descriptor at `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist, which means no
    /// schedule is configured.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(TrackError::Schedule(format!(
                    "cannot read descriptor '{}': {e}",
                    path.display()
                )));
            }
        };

        let value = plist::Value::from_reader(std::io::Cursor::new(bytes)).map_err(|e| {
            TrackError::Schedule(format!("cannot parse descriptor '{}': {e}", path.display()))
        })?;
        let mut dict = value.into_dictionary().ok_or_else(|| {
            TrackError::Schedule(format!(
                "descriptor '{}' is not a dictionary at top level",
                path.display()
            ))
        })?;

        let label = dict
            .remove("Label")
            .and_then(plist::Value::into_string)
            .ok_or_else(|| {
                TrackError::Schedule(format!("descriptor '{}' has no Label", path.display()))
            })?;

        let program_arguments = match dict.remove("ProgramArguments") {
            Some(value) => plist::from_value(&value).map_err(|e| {
                TrackError::Schedule(format!("descriptor ProgramArguments are malformed: {e}"))
            })?,
            None => Vec::new(),
        };

        let triggers = match dict.remove("StartCalendarInterval") {
            Some(value) => triggers_from_value(&value)?,
            None => Vec::new(),
        };

        let stdout_path = dict
            .remove("StandardOutPath")
            .and_then(plist::Value::into_string);
        let stderr_path = dict
            .remove("StandardErrorPath")
            .and_then(plist::Value::into_string);

        Ok(Some(Self {
            label,
            program_arguments,
            triggers,
            stdout_path,
            stderr_path,
            extra: dict,
        }))
    }

    /// Write the descriptor as an XML property list, atomically
    /// (temp file → fsync → rename). Triggers are sorted ascending first.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut triggers = self.triggers.clone();
        triggers.sort_unstable();

        let mut dict = self.extra.clone();
        dict.insert(
            "Label".to_owned(),
            plist::Value::String(self.label.clone()),
        );
        dict.insert(
            "ProgramArguments".to_owned(),
            plist::to_value(&self.program_arguments).map_err(|e| {
                TrackError::Schedule(format!("cannot serialize ProgramArguments: {e}"))
            })?,
        );
        if !triggers.is_empty() {
            dict.insert("StartCalendarInterval".to_owned(), triggers_to_value(&triggers)?);
        }
        if let Some(p) = &self.stdout_path {
            dict.insert(
                "StandardOutPath".to_owned(),
                plist::Value::String(p.clone()),
            );
        }
        if let Some(p) = &self.stderr_path {
            dict.insert(
                "StandardErrorPath".to_owned(),
                plist::Value::String(p.clone()),
            );
        }

        let value = plist::Value::Dictionary(dict);
        let tmp_path = path.with_extension("plist.tmp");

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TrackError::Schedule(format!(
                    "cannot create agents directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }

        let mut file = std::fs::File::create(&tmp_path).map_err(|e| {
            TrackError::Schedule(format!(
                "cannot create temp descriptor '{}': {e}",
                tmp_path.display()
            ))
        })?;
        value
            .to_writer_xml(&mut file)
            .map_err(|e| TrackError::Schedule(format!("cannot write descriptor: {e}")))?;
        file.sync_all()
            .map_err(|e| TrackError::Schedule(format!("cannot sync descriptor: {e}")))?;

        std::fs::rename(&tmp_path, path).map_err(|e| {
            TrackError::Schedule(format!(
                "cannot rename '{}' to '{}': {e}",
                tmp_path.display(),
                path.display()
            ))
        })
    }
}

/// Read triggers from either calendar-interval shape.
fn triggers_from_value(value: &plist::Value) -> Result<Vec<Trigger>> {
    match value {
        plist::Value::Dictionary(_) => {
            let trigger: Trigger = plist::from_value(value).map_err(|e| {
                TrackError::Schedule(format!("malformed calendar interval: {e}"))
            })?;
            Ok(vec![trigger])
        }
        plist::Value::Array(items) => items
            .iter()
            .map(|item| {
                plist::from_value(item).map_err(|e| {
                    TrackError::Schedule(format!("malformed calendar interval: {e}"))
                })
            })
            .collect(),
        _ => Err(TrackError::Schedule(
            "StartCalendarInterval has an unsupported shape".to_owned(),
        )),
    }
}

/// Write triggers in the shape launchd expects: a single dictionary for one
/// firing time, an array of dictionaries otherwise.
fn triggers_to_value(triggers: &[Trigger]) -> Result<plist::Value> {
    let result = if triggers.len() == 1 {
        plist::to_value(&triggers[0])
    } else {
        plist::to_value(&triggers)
    };
    result.map_err(|e| TrackError::Schedule(format!("cannot serialize calendar intervals: {e}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn trigger(hour: u8, minute: u8) -> Trigger {
        Trigger::new(hour, minute).expect("valid trigger")
    }

    fn make_descriptor() -> Descriptor {
        let mut descriptor = Descriptor::new(
            "com.saorsalabs.filepulse",
            vec!["/usr/local/bin/filepulse".to_owned(), "run".to_owned()],
        );
        descriptor.stdout_path = Some("/tmp/filepulse.out.log".to_owned());
        descriptor.stderr_path = Some("/tmp/filepulse.err.log".to_owned());
        descriptor
    }

    #[test]
    fn load_missing_file_means_unconfigured() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Descriptor::load(&dir.path().join("absent.plist")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.plist");

        let mut descriptor = make_descriptor();
        descriptor.triggers = vec![trigger(9, 0), trigger(21, 0)];
        descriptor.save(&path).unwrap();

        let restored = Descriptor::load(&path).unwrap().expect("configured");
        assert_eq!(restored.label, "com.saorsalabs.filepulse");
        assert_eq!(restored.program_arguments.len(), 2);
        assert_eq!(restored.triggers, vec![trigger(9, 0), trigger(21, 0)]);
        assert_eq!(
            restored.stdout_path.as_deref(),
            Some("/tmp/filepulse.out.log")
        );
    }

    #[test]
    fn single_trigger_is_written_as_a_dictionary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.plist");

        let mut descriptor = make_descriptor();
        descriptor.triggers = vec![trigger(9, 30)];
        descriptor.save(&path).unwrap();

        let raw = plist::Value::from_file(&path).unwrap();
        let dict = raw.as_dictionary().expect("top-level dictionary");
        let interval = dict.get("StartCalendarInterval").expect("interval");
        assert!(matches!(interval, plist::Value::Dictionary(_)));
    }

    #[test]
    fn multiple_triggers_are_written_as_an_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.plist");

        let mut descriptor = make_descriptor();
        descriptor.triggers = vec![trigger(9, 0), trigger(21, 0)];
        descriptor.save(&path).unwrap();

        let raw = plist::Value::from_file(&path).unwrap();
        let dict = raw.as_dictionary().expect("top-level dictionary");
        let interval = dict.get("StartCalendarInterval").expect("interval");
        match interval {
            plist::Value::Array(items) => assert_eq!(items.len(), 2),
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn single_dictionary_form_is_accepted_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.plist");

        let mut interval = plist::Dictionary::new();
        interval.insert("Hour".to_owned(), plist::Value::Integer(7.into()));
        interval.insert("Minute".to_owned(), plist::Value::Integer(15.into()));

        let mut dict = plist::Dictionary::new();
        dict.insert("Label".to_owned(), plist::Value::String("x".to_owned()));
        dict.insert(
            "StartCalendarInterval".to_owned(),
            plist::Value::Dictionary(interval),
        );
        plist::Value::Dictionary(dict).to_file_xml(&path).unwrap();

        let restored = Descriptor::load(&path).unwrap().expect("configured");
        assert_eq!(restored.triggers, vec![trigger(7, 15)]);
    }

    #[test]
    fn triggers_are_sorted_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.plist");

        let mut descriptor = make_descriptor();
        descriptor.triggers = vec![trigger(21, 0), trigger(0, 5), trigger(9, 30)];
        descriptor.save(&path).unwrap();

        let restored = Descriptor::load(&path).unwrap().expect("configured");
        assert_eq!(
            restored.triggers,
            vec![trigger(0, 5), trigger(9, 30), trigger(21, 0)]
        );
    }

    #[test]
    fn unmanaged_keys_survive_a_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.plist");

        let mut environment = plist::Dictionary::new();
        environment.insert(
            "PATH".to_owned(),
            plist::Value::String("/usr/local/bin:/usr/bin".to_owned()),
        );

        let mut dict = plist::Dictionary::new();
        dict.insert("Label".to_owned(), plist::Value::String("x".to_owned()));
        dict.insert("RunAtLoad".to_owned(), plist::Value::Boolean(true));
        dict.insert(
            "EnvironmentVariables".to_owned(),
            plist::Value::Dictionary(environment),
        );
        plist::Value::Dictionary(dict).to_file_xml(&path).unwrap();

        let mut descriptor = Descriptor::load(&path).unwrap().expect("configured");
        descriptor.triggers = vec![trigger(9, 0)];
        descriptor.save(&path).unwrap();

        let raw = plist::Value::from_file(&path).unwrap();
        let dict = raw.as_dictionary().expect("top-level dictionary");
        assert_eq!(
            dict.get("RunAtLoad"),
            Some(&plist::Value::Boolean(true))
        );
        let env = dict
            .get("EnvironmentVariables")
            .and_then(plist::Value::as_dictionary)
            .expect("environment preserved");
        assert_eq!(
            env.get("PATH"),
            Some(&plist::Value::String("/usr/local/bin:/usr/bin".to_owned()))
        );
    }

    #[test]
    fn descriptor_without_label_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.plist");

        let mut dict = plist::Dictionary::new();
        dict.insert("RunAtLoad".to_owned(), plist::Value::Boolean(true));
        plist::Value::Dictionary(dict).to_file_xml(&path).unwrap();

        let result = Descriptor::load(&path);
        assert!(matches!(result, Err(TrackError::Schedule(_))));
    }

    #[test]
    fn empty_trigger_list_omits_the_interval_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.plist");

        make_descriptor().save(&path).unwrap();

        let raw = plist::Value::from_file(&path).unwrap();
        let dict = raw.as_dictionary().expect("top-level dictionary");
        assert!(dict.get("StartCalendarInterval").is_none());
    }
}
