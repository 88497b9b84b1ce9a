use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn wizard_log_path(state_root: &Path) -> PathBuf {
    state_root.join("logs/wizard.log")
}

/// One line in the wizard log: timestamp, step, event name and key=value
/// fields. Values containing whitespace are quoted.
pub struct WizardLogEntry<'a> {
    pub step: &'a str,
    pub event: &'a str,
    pub fields: Vec<(&'a str, String)>,
}

impl WizardLogEntry<'_> {
    fn render(&self) -> String {
        let mut line = format!(
            "ts={} step={} event={}",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            self.step,
            self.event
        );
        for (key, value) in &self.fields {
            if value.contains(char::is_whitespace) {
                line.push_str(&format!(" {key}=\"{value}\""));
            } else {
                line.push_str(&format!(" {key}={value}"));
            }
        }
        line
    }
}

pub fn append_wizard_log_entry(
    state_root: &Path,
    entry: &WizardLogEntry<'_>,
) -> std::io::Result<()> {
    let path = wizard_log_path(state_root);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    writeln!(file, "{}", entry.render())
}
