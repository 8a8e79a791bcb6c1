use crate::commands::{CmdMessage, CmdResult};
use crate::registry::StartupReport;

/// Turns a startup report into user-facing messages.
pub fn summarize(report: StartupReport) -> CmdResult {
    let mut result = CmdResult::default();

    if report.already_initialized() {
        result.add_message(CmdMessage::info("Shelf already reconciled in this process."));
        result.report = Some(report);
        return result;
    }

    if let Some(fonts) = &report.fonts {
        result.add_message(CmdMessage::info(format!("Loaded {} font(s).", fonts.loaded)));
        for purged in &fonts.purged {
            result.add_message(CmdMessage::warning(format!(
                "  - Removed font '{}': {}",
                purged.name, purged.reason
            )));
        }
    }

    if let Some(templates) = &report.templates {
        result.add_message(CmdMessage::info(format!(
            "Loaded {} template(s).",
            templates.loaded
        )));
        for name in &templates.imported {
            result.add_message(CmdMessage::success(format!(
                "  - Imported template '{}' from the templates directory.",
                name
            )));
        }
        for failure in &templates.import_failures {
            result.add_message(CmdMessage::warning(format!(
                "  - Could not import '{}': {}",
                failure.name, failure.reason
            )));
        }
        for failure in &templates.mirror_failures {
            result.add_message(CmdMessage::error(format!(
                "  - Could not write template file for '{}': {}",
                failure.name, failure.reason
            )));
        }
        for issue in &templates.skipped {
            result.add_message(CmdMessage::warning(format!(
                "  - Skipped stored template '{}': {}",
                issue.name, issue.reason
            )));
        }
    }

    if report.is_clean() {
        result.add_message(CmdMessage::success("No inconsistencies found."));
    }
    result.report = Some(report);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::registry::{FontReconcileReport, ReconcileIssue, TemplateReconcileReport};

    #[test]
    fn clean_report() {
        let report = StartupReport {
            fonts: Some(FontReconcileReport::default()),
            templates: Some(TemplateReconcileReport::default()),
        };
        let result = summarize(report);
        assert!(result
            .messages
            .iter()
            .any(|m| m.content.contains("No inconsistencies")));
    }

    #[test]
    fn purged_fonts_and_imports_are_listed() {
        let report = StartupReport {
            fonts: Some(FontReconcileReport {
                loaded: 1,
                purged: vec![ReconcileIssue::new("Gone", "font file not found")],
                notified: true,
            }),
            templates: Some(TemplateReconcileReport {
                imported: vec!["foo".to_string()],
                ..Default::default()
            }),
        };
        let result = summarize(report);

        assert!(result
            .messages
            .iter()
            .any(|m| m.level == MessageLevel::Warning && m.content.contains("Gone")));
        assert!(result
            .messages
            .iter()
            .any(|m| m.level == MessageLevel::Success && m.content.contains("foo")));
        assert!(!result
            .messages
            .iter()
            .any(|m| m.content.contains("No inconsistencies")));
    }

    #[test]
    fn already_initialized() {
        let result = summarize(StartupReport::default());
        assert_eq!(result.messages.len(), 1);
        assert!(result.report.is_some());
    }
}
