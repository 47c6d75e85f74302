use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use std::io;
use std::path::{Path, PathBuf};

use crate::conditions::{Action, Condition, Operator};
use crate::config::{self, Config};
use crate::form::{
    self, verify_form, FieldType, FormBuilder, FormDefinition, FormValue, FormValues,
    SessionContext,
};
use crate::logging;

use super::exit_codes;
use super::output::{
    self, CheckData, FieldData, FieldListData, OutputMode, ResolveData, RuleData, RuleListData,
    VerifyData,
};
use super::CliError;

#[derive(Parser)]
#[command(name = "formlogic")]
#[command(about = "Evaluate and edit conditional logic in form definitions")]
#[command(version)]
pub struct Cli {
    /// Path to config file (overrides FORMLOGIC_CONFIG env var and default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (auto-enabled when stdout is piped)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Force text output even when stdout is piped
    #[arg(long, global = true, conflicts_with = "json")]
    pub no_json: bool,

    /// Suppress all output on success (errors still go to stderr)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve visibility and requiredness of every field
    Resolve {
        /// Form definition file (JSON or JSON5)
        form: PathBuf,

        #[command(flatten)]
        values: ValueArgs,

        /// Resolve a single field only
        #[arg(long)]
        field: Option<String>,

        /// Custom output format using {field} placeholders (e.g., "{id}: {isVisible}")
        #[arg(long)]
        format: Option<String>,
    },

    /// Validate a submission: every visible, required field must be filled
    Check {
        /// Form definition file (JSON or JSON5)
        form: PathBuf,

        #[command(flatten)]
        values: ValueArgs,
    },

    /// Report structural problems in a form definition
    Verify {
        /// Form definition file (JSON or JSON5)
        form: PathBuf,

        /// Treat warnings as failures (overrides settings.verify.strict)
        #[arg(long)]
        strict: bool,
    },

    /// Edit the rules of a form
    Rule {
        #[command(subcommand)]
        command: RuleCommands,
    },

    /// Edit the fields of a form
    Field {
        #[command(subcommand)]
        command: FieldCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct ValueArgs {
    /// Values file (JSON or JSON5 object keyed by field id)
    #[arg(long)]
    pub values: Option<PathBuf>,

    /// Set a value: key=text or key:=json (repeatable, applied after --values)
    #[arg(long = "set", value_name = "KEY=VALUE", action = ArgAction::Append)]
    pub set: Vec<String>,
}

#[derive(Subcommand)]
pub enum RuleCommands {
    /// List rules in evaluation order
    List {
        #[arg(long)]
        form: PathBuf,
    },
    /// Append a rule
    Add {
        #[arg(long)]
        form: PathBuf,

        /// Field whose value is inspected
        #[arg(long)]
        source: String,

        /// Comparison operator (equals, contains, greater_than, is_empty, ...)
        #[arg(long)]
        operator: String,

        /// Comparison value (not needed for is_empty / is_not_empty)
        #[arg(long, default_value = "")]
        value: String,

        /// Field affected when the rule fires
        #[arg(long)]
        target: String,

        /// show, hide, require, or optional
        #[arg(long)]
        action: String,

        /// Rule id (generated when omitted or already taken)
        #[arg(long)]
        id: Option<String>,
    },
    /// Change parts of an existing rule
    Update {
        #[arg(long)]
        form: PathBuf,

        /// Rule id
        id: String,

        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        operator: Option<String>,

        #[arg(long)]
        value: Option<String>,

        #[arg(long)]
        target: Option<String>,

        #[arg(long)]
        action: Option<String>,
    },
    /// Remove a rule
    Remove {
        #[arg(long)]
        form: PathBuf,

        /// Rule id
        id: String,
    },
}

#[derive(Subcommand)]
pub enum FieldCommands {
    /// List fields in display order
    List {
        #[arg(long)]
        form: PathBuf,
    },
    /// Add a field
    Add {
        #[arg(long)]
        form: PathBuf,

        /// Field label
        label: String,

        /// Field type (text, email, select, datetime-local, ...)
        #[arg(long = "type", default_value = "text", value_parser = parse_field_type)]
        field_type: FieldType,

        /// Mark the field required
        #[arg(long)]
        required: bool,

        /// Option value for select, radio and checkbox fields (repeatable)
        #[arg(long = "option", action = ArgAction::Append)]
        options: Vec<String>,

        /// Insert at this position instead of appending
        #[arg(long)]
        at: Option<usize>,
    },
    /// Change label, requiredness, or options of a field
    Update {
        #[arg(long)]
        form: PathBuf,

        /// Field id
        id: String,

        #[arg(long)]
        label: Option<String>,

        /// true/false, yes/no, 1/0, on/off
        #[arg(long, value_parser = parse_bool_arg)]
        required: Option<bool>,

        /// Replace the option list (repeatable)
        #[arg(long = "option", action = ArgAction::Append)]
        options: Vec<String>,
    },
    /// Remove a field and every rule that references it
    Remove {
        #[arg(long)]
        form: PathBuf,

        /// Field id
        id: String,
    },
    /// Move a field to a new position
    Move {
        #[arg(long)]
        form: PathBuf,

        /// Field id
        id: String,

        /// Target position (0-based)
        #[arg(long)]
        to: usize,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "settings.verify.strict")
        key: String,
        /// Value to set
        value: String,
    },
    /// Reset configuration to defaults
    Reset,
}

fn parse_field_type(s: &str) -> Result<FieldType, String> {
    FieldType::parse(s).ok_or_else(|| {
        let valid: Vec<&str> = FieldType::ALL.iter().map(|t| t.as_str()).collect();
        format!("unknown field type '{}'. Use one of: {}", s, valid.join(", "))
    })
}

fn parse_bool_arg(s: &str) -> Result<bool, String> {
    config::parse_bool(s).map_err(|e| e.to_string())
}

/// load the values file, then apply --set assignments on top
fn gather_values(args: &ValueArgs) -> Result<FormValues> {
    let mut values = match &args.values {
        Some(path) => form::load_values(path)?,
        None => FormValues::new(),
    };

    for assignment in &args.set {
        let (key, value) = FormValue::parse_assignment(assignment)?;
        values.insert(key, value);
    }

    Ok(values)
}

/// open a form for editing, run the edit, then save it back
fn edit_form<T>(
    path: &Path,
    edit: impl FnOnce(&mut FormBuilder) -> Result<T>,
) -> Result<(T, FormDefinition)> {
    let definition = form::load_form(path)?;
    let session = SessionContext::new(format!("cli-{}", std::process::id()));
    let mut builder = FormBuilder::new(definition, session);

    let result = edit(&mut builder)?;

    let definition = builder.into_form();
    form::save_form(path, &definition)?;
    Ok((result, definition))
}

fn rule_draft(
    source: &str,
    operator: &str,
    value: &str,
    target: &str,
    action: &str,
) -> Condition {
    Condition::new(
        "",
        source,
        Operator::parse(operator),
        value,
        target,
        Action::parse(action),
    )
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    config::load_with_override(path)
        .map_err(|e| CliError::new(exit_codes::CONFIG_ERROR, format!("{:#}", e)).into())
}

pub fn execute(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            logging::init(cli.verbose, config::DEFAULT_LOG_LEVEL);
            return Err(e);
        }
    };
    logging::init(cli.verbose, &config.settings.log_level);

    let pretty = config.settings.output.pretty;
    let output_mode = OutputMode::from_flags(cli.json, cli.no_json, cli.quiet, false);

    match cli.command {
        Commands::Resolve {
            form: form_path,
            values,
            field,
            format,
        } => {
            let definition = form::load_form(&form_path)?;
            let values = gather_values(&values)?;

            let mut resolved = definition.resolve_all(&values);
            if let Some(id) = &field {
                resolved.retain(|r| &r.id == id);
                if resolved.is_empty() {
                    return Err(form::FormError::UnknownField {
                        id: id.clone(),
                        suggestions: crate::conditions::suggest_fields(id, &definition.fields),
                    }
                    .into());
                }
            }

            let mode = OutputMode::from_flags(cli.json, cli.no_json, cli.quiet, format.is_some());
            match mode {
                OutputMode::Quiet => {}
                OutputMode::Json => {
                    let data = ResolveData {
                        form: definition.id.clone(),
                        fields: resolved,
                    };
                    output::print_json(&data, pretty);
                }
                OutputMode::Format => {
                    let template = format.as_deref().unwrap_or_default();
                    for r in &resolved {
                        println!("{}", output::format_template(template, r));
                    }
                }
                OutputMode::Text => {
                    let width = resolved.iter().map(|r| r.id.len()).max().unwrap_or(0);
                    for r in &resolved {
                        println!(
                            "{:<width$}  {:<7}  {}",
                            r.id,
                            if r.state.is_visible { "visible" } else { "hidden" },
                            if r.state.is_required { "required" } else { "optional" },
                            width = width
                        );
                    }
                }
            }
            Ok(())
        }

        Commands::Check {
            form: form_path,
            values,
        } => {
            let definition = form::load_form(&form_path)?;
            let values = gather_values(&values)?;
            let report = definition.validate_submission(&values);

            if !report.is_valid() {
                let ids: Vec<String> = report.missing.iter().map(|m| m.id.clone()).collect();
                if !output_mode.is_json() && !output_mode.is_quiet() {
                    println!("✗ Missing {} required field(s):", report.missing.len());
                    for m in &report.missing {
                        println!("  - {} ({})", m.label, m.id);
                    }
                }
                return Err(CliError::new(
                    exit_codes::VALIDATION_FAILED,
                    format!("required fields missing: {}", ids.join(", ")),
                )
                .with_details(ids)
                .into());
            }

            match output_mode {
                OutputMode::Json => {
                    let data = CheckData {
                        valid: true,
                        checked: report.checked,
                        missing: report.missing,
                    };
                    output::print_json(&data, pretty);
                }
                OutputMode::Text | OutputMode::Format => {
                    println!(
                        "✓ All {} required field(s) filled",
                        report.checked.len()
                    );
                }
                OutputMode::Quiet => {}
            }
            Ok(())
        }

        Commands::Verify {
            form: form_path,
            strict,
        } => {
            let definition = form::load_form(&form_path)?;
            let issues = verify_form(&definition);
            let strict = strict || config.settings.verify.strict;
            let failed = form::has_failures(&issues, strict);

            match output_mode {
                OutputMode::Json if !failed => {
                    let data = VerifyData {
                        path: form_path.display().to_string(),
                        valid: true,
                        issues,
                    };
                    output::print_json(&data, pretty);
                    return Ok(());
                }
                OutputMode::Json | OutputMode::Quiet => {}
                OutputMode::Text | OutputMode::Format => {
                    if issues.is_empty() {
                        println!("✓ Form is valid: {}", form_path.display());
                    } else {
                        println!(
                            "{} Form has {} issue(s): {}",
                            if failed { "✗" } else { "!" },
                            issues.len(),
                            form_path.display()
                        );
                        println!();
                        for issue in &issues {
                            println!("  - {}", issue);
                        }
                    }
                }
            }

            if failed {
                let details = issues.iter().map(|i| i.to_string()).collect();
                return Err(CliError::new(exit_codes::FORM_ERROR, "form verification failed")
                    .with_details(details)
                    .into());
            }
            Ok(())
        }

        Commands::Rule { command } => match command {
            RuleCommands::List { form: form_path } => {
                let definition = form::load_form(&form_path)?;

                match output_mode {
                    OutputMode::Json => {
                        let data = RuleListData {
                            rules: definition.conditions,
                        };
                        output::print_json(&data, pretty);
                    }
                    OutputMode::Text | OutputMode::Format => {
                        if definition.conditions.is_empty() {
                            println!("No rules");
                        }
                        for (i, rule) in definition.conditions.iter().enumerate() {
                            println!("{}. [{}] {}", i + 1, rule.id, rule);
                        }
                    }
                    OutputMode::Quiet => {}
                }
                Ok(())
            }
            RuleCommands::Add {
                form: form_path,
                source,
                operator,
                value,
                target,
                action,
                id,
            } => {
                let mut draft = rule_draft(&source, &operator, &value, &target, &action);
                draft.id = id.unwrap_or_default();

                let (rule_id, definition) = edit_form(&form_path, |builder| {
                    Ok(builder.add_condition(draft)?)
                })?;
                report_rule(output_mode, pretty, "add", &definition, &rule_id);
                Ok(())
            }
            RuleCommands::Update {
                form: form_path,
                id,
                source,
                operator,
                value,
                target,
                action,
            } => {
                let ((), definition) = edit_form(&form_path, |builder| {
                    let current = builder
                        .form()
                        .conditions
                        .iter()
                        .find(|c| c.id == id)
                        .cloned()
                        .ok_or_else(|| crate::conditions::RuleError::NotFound(id.clone()))?;

                    let draft = Condition {
                        id: id.clone(),
                        source_field: source.unwrap_or(current.source_field),
                        operator: operator.map(|o| Operator::parse(&o)).unwrap_or(current.operator),
                        value: value.unwrap_or(current.value),
                        target_field: target.unwrap_or(current.target_field),
                        action: action.map(|a| Action::parse(&a)).unwrap_or(current.action),
                    };
                    Ok(builder.update_condition(&id, draft)?)
                })?;
                report_rule(output_mode, pretty, "update", &definition, &id);
                Ok(())
            }
            RuleCommands::Remove { form: form_path, id } => {
                let (removed, _) =
                    edit_form(&form_path, |builder| Ok(builder.remove_condition(&id)?))?;

                match output_mode {
                    OutputMode::Json => output::print_json(
                        &RuleData {
                            action: "remove",
                            rule: removed,
                        },
                        pretty,
                    ),
                    OutputMode::Text | OutputMode::Format => {
                        println!("Removed rule {}: {}", id, removed)
                    }
                    OutputMode::Quiet => {}
                }
                Ok(())
            }
        },

        Commands::Field { command } => match command {
            FieldCommands::List { form: form_path } => {
                let definition = form::load_form(&form_path)?;
                let fields: Vec<form::Field> =
                    definition.ordered_fields().into_iter().cloned().collect();

                match output_mode {
                    OutputMode::Json => output::print_json(&FieldListData { fields }, pretty),
                    OutputMode::Text | OutputMode::Format => {
                        for f in &fields {
                            let required = if f.is_required { " *" } else { "" };
                            println!(
                                "{}. {} ({}) [{}]{}",
                                f.display_order, f.label, f.id, f.field_type, required
                            );
                        }
                    }
                    OutputMode::Quiet => {}
                }
                Ok(())
            }
            FieldCommands::Add {
                form: form_path,
                label,
                field_type,
                required,
                options,
                at,
            } => {
                let (field_id, definition) = edit_form(&form_path, |builder| {
                    let id = match at {
                        Some(index) => builder.insert_field(index, label, field_type)?,
                        None => builder.add_field(label, field_type),
                    };
                    if required {
                        builder.set_required(&id, true)?;
                    }
                    if !options.is_empty() {
                        builder.set_options(&id, options)?;
                    }
                    Ok(id)
                })?;
                report_field(output_mode, pretty, "add", &definition, &field_id);
                Ok(())
            }
            FieldCommands::Update {
                form: form_path,
                id,
                label,
                required,
                options,
            } => {
                let ((), definition) = edit_form(&form_path, |builder| {
                    if let Some(label) = label {
                        builder.set_label(&id, label)?;
                    }
                    if let Some(required) = required {
                        builder.set_required(&id, required)?;
                    }
                    if !options.is_empty() {
                        builder.set_options(&id, options)?;
                    }
                    Ok(())
                })?;
                report_field(output_mode, pretty, "update", &definition, &id);
                Ok(())
            }
            FieldCommands::Remove { form: form_path, id } => {
                let ((removed, dropped), _) = edit_form(&form_path, |builder| {
                    let dropped = builder
                        .form()
                        .conditions
                        .iter()
                        .filter(|c| c.references(&id))
                        .count();
                    Ok((builder.remove_field(&id)?, dropped))
                })?;

                match output_mode {
                    OutputMode::Json => output::print_json(
                        &FieldData {
                            action: "remove",
                            field: removed,
                        },
                        pretty,
                    ),
                    OutputMode::Text | OutputMode::Format => {
                        println!("Removed field {} ({})", removed.id, removed.label);
                        if dropped > 0 {
                            println!("Dropped {} rule(s) referencing it", dropped);
                        }
                    }
                    OutputMode::Quiet => {}
                }
                Ok(())
            }
            FieldCommands::Move {
                form: form_path,
                id,
                to,
            } => {
                let ((), definition) =
                    edit_form(&form_path, |builder| Ok(builder.move_field(&id, to)?))?;
                report_field(output_mode, pretty, "move", &definition, &id);
                Ok(())
            }
        },

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let json =
                    serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
                println!("{}", json);
                Ok(())
            }
            ConfigCommands::Path => {
                let path = config::get_config_path_with_override(config_path);
                println!("{}", path.display());
                Ok(())
            }
            ConfigCommands::Set { key, value } => {
                let mut config = config;
                config::set_value(&mut config, &key, &value)
                    .map_err(|e| CliError::new(exit_codes::INVALID_ARGS, e.to_string()))?;
                config::save_with_override(&config, config_path)
                    .map_err(|e| CliError::new(exit_codes::CONFIG_ERROR, format!("{:#}", e)))?;
                if !output_mode.is_quiet() {
                    println!("Set {} = {}", key, value);
                }
                Ok(())
            }
            ConfigCommands::Reset => {
                config::save_with_override(&Config::default(), config_path)
                    .map_err(|e| CliError::new(exit_codes::CONFIG_ERROR, format!("{:#}", e)))?;
                if !output_mode.is_quiet() {
                    println!("Configuration reset to defaults");
                }
                Ok(())
            }
        },

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "formlogic", &mut io::stdout());
            Ok(())
        }
    }
}

fn report_rule(
    mode: OutputMode,
    pretty: bool,
    action: &'static str,
    form: &FormDefinition,
    id: &str,
) {
    let Some(rule) = form.conditions.iter().find(|c| c.id == id) else {
        return;
    };

    match mode {
        OutputMode::Json => output::print_json(
            &RuleData {
                action,
                rule: rule.clone(),
            },
            pretty,
        ),
        OutputMode::Text | OutputMode::Format => {
            let verb = if action == "add" { "Added" } else { "Updated" };
            println!("{} rule {}: {}", verb, rule.id, rule);
        }
        OutputMode::Quiet => {}
    }
}

fn report_field(
    mode: OutputMode,
    pretty: bool,
    action: &'static str,
    form: &FormDefinition,
    id: &str,
) {
    let Some(field) = form.field(id) else {
        return;
    };

    match mode {
        OutputMode::Json => output::print_json(
            &FieldData {
                action,
                field: field.clone(),
            },
            pretty,
        ),
        OutputMode::Text | OutputMode::Format => {
            let verb = match action {
                "add" => "Added",
                "move" => "Moved",
                _ => "Updated",
            };
            println!(
                "{} field {} ({}) at position {}",
                verb, field.id, field.label, field.display_order
            );
        }
        OutputMode::Quiet => {}
    }
}
