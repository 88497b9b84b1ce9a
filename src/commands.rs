use crate::catalogue;

pub fn help_text() -> String {
    [
        "Usage: vglaunch <command>",
        "",
        "Commands:",
        "  wizard               launch the job configuration wizard",
        "  catalogue [toolbox]  print the script builder template tree for a toolbox",
        "                       (ubc-gif, escript, underworld; anything else prints all)",
        "  help                 show this message",
    ]
    .join("\n")
}

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let Some(verb) = args.first() else {
        return Ok(help_text());
    };
    match verb.as_str() {
        "wizard" => crate::tui::job_form::cmd_wizard(),
        "catalogue" => cmd_catalogue(args.get(1).map(String::as_str).unwrap_or("")),
        "help" | "--help" | "-h" => Ok(help_text()),
        other => Err(format!("unknown command `{other}`\n\n{}", help_text())),
    }
}

fn cmd_catalogue(toolbox: &str) -> Result<String, String> {
    serde_json::to_string_pretty(&catalogue::get_catalogue(toolbox))
        .map_err(|e| format!("failed to encode catalogue: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_args_print_help() {
        assert_eq!(run_cli(Vec::new()), Ok(help_text()));
    }

    #[test]
    fn unknown_command_is_an_error() {
        let err = run_cli(vec!["frobnicate".to_string()]).expect_err("unknown command");
        assert!(err.contains("unknown command `frobnicate`"));
    }

    #[test]
    fn catalogue_command_prints_json_tree() {
        let output = run_cli(vec!["catalogue".to_string(), "escript".to_string()])
            .expect("catalogue output");
        assert!(output.contains("\"Script Builder Components\""));
        assert!(output.contains("ScriptBuilder.templates.EScriptGravityTemplate"));
        assert!(!output.contains("UnderworldGocadTemplate"));
    }
}
