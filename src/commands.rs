// Command dispatch. Every remote operation is described by a `Descriptor`
// (method, path, auth flag, body, messages, how to render `data`) and run
// through the single `run` function. Validation happens while the
// descriptor is built, so an invalid command never reaches the network.

use crate::api::{ApiClient, Envelope};
use crate::error::{CliError, CliResult};
use crate::store::{ConfigStore, Configuration, Credential};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

/// One remote operation with the raw values given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateDatabase {
        name: String,
        user: String,
        password: String,
    },
    Connect {
        name: String,
        user: String,
        password: String,
    },
    ChangePassword {
        name: String,
        user: String,
        old_password: String,
        new_password: String,
    },
    ListTables,
    GetTable {
        table: String,
    },
    GetById {
        table: String,
        doc_id: String,
    },
    Update {
        table: String,
        data: String,
        doc_id: String,
    },
    Persist {
        table: String,
        data: String,
    },
    History {
        table: String,
        limit: String,
    },
    Find {
        table: String,
        criteria: String,
        limit: String,
        reverse: bool,
    },
    FindAdvanced {
        table: String,
        criteria: String,
        limit: String,
        reverse: bool,
    },
}

/// How the `data` of a successful envelope is shown.
#[derive(Debug, Clone)]
pub enum Render {
    Nothing,
    Notice(&'static str),
    /// Always printed, `null` included.
    Value { heading: &'static str },
    /// Printed when present and not `false`/`0`/`""`, otherwise `missing` (if any).
    IfPresent {
        heading: &'static str,
        missing: Option<String>,
    },
    /// A list of records, one block each. Anything but an array counts as empty.
    Records {
        heading: fn(usize) -> String,
        empty: &'static str,
    },
    Tables,
    /// `data` is a token to store for `database`.
    Token { database: String },
}

#[derive(Debug, Clone)]
pub struct Descriptor {
    pub method: Method,
    pub path: String,
    pub requires_auth: bool,
    pub body: Option<Value>,
    pub pending: String,
    pub success: String,
    pub action: &'static str,
    pub render: Render,
}

/// A rendered piece of command output.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Heading(String),
    Label(String),
    Json(Value),
    Note(String),
    Item(usize, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub headline: String,
    pub lines: Vec<Line>,
}

impl Report {
    fn new(headline: impl Into<String>) -> Self {
        Report {
            headline: headline.into(),
            lines: Vec::new(),
        }
    }
}

/// Progress notifications emitted around the network call.
pub trait Progress {
    fn start(&mut self, message: &str);
    fn finish(&mut self);
}

/// Discards progress notifications.
pub struct Silent;

impl Progress for Silent {
    fn start(&mut self, _message: &str) {}
    fn finish(&mut self) {}
}

fn parse_json(raw: &str, what: &str) -> CliResult<Value> {
    serde_json::from_str(raw)
        .map_err(|_| CliError::validation(format!("The provided {what} is not valid JSON.")))
}

/// Accepts only strictly positive integers.
pub fn parse_limit(raw: &str) -> CliResult<u64> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok(n as u64),
        _ => Err(CliError::validation("The limit must be a positive number.")),
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Checks the `[{field, operator, value}, ...]` shape of advanced criteria.
///
/// `value` only has to be present; `null`, `false` and `0` are all fine.
pub fn validate_advanced_criteria(criteria: &Value) -> CliResult<()> {
    let items = criteria
        .as_array()
        .ok_or_else(|| CliError::validation("Advanced criteria must be an array of objects."))?;
    for item in items {
        let ok = item.as_object().is_some_and(|obj| {
            truthy(obj.get("field")) && truthy(obj.get("operator")) && obj.contains_key("value")
        });
        if !ok {
            return Err(CliError::validation(
                "Each criterion must have \"field\", \"operator\", and \"value\" fields.",
            ));
        }
    }
    Ok(())
}

/// Rejects anything but a non-empty `http://` or `https://` URL.
pub fn validate_host(host: &str) -> Result<(), String> {
    if host.is_empty() {
        return Err("Host cannot be empty".into());
    }
    if !host.starts_with("http://") && !host.starts_with("https://") {
        return Err("Host must start with http:// or https://".into());
    }
    Ok(())
}

/// Validates and persists a new host.
pub fn configure(store: &ConfigStore, host: &str) -> CliResult<Report> {
    validate_host(host).map_err(CliError::Validation)?;
    store.save(&Configuration {
        host: host.to_string(),
    })?;
    Ok(Report::new(format!("Host configured to: {host}")))
}

fn search_body(criteria: Value, limit: &str, reverse: bool) -> CliResult<Value> {
    let limit = parse_limit(limit)?;
    Ok(json!({ "criteria": criteria, "limit": limit, "reverse": reverse }))
}

fn results_heading(n: usize) -> String {
    format!("Results ({n} records found):")
}

fn history_heading(n: usize) -> String {
    format!("History (last {n} records):")
}

impl Command {
    /// Validate the command and describe the request it maps to.
    pub fn descriptor(&self) -> CliResult<Descriptor> {
        let d = match self {
            Command::CreateDatabase {
                name,
                user,
                password,
            } => Descriptor {
                method: Method::POST,
                path: "database/create".into(),
                requires_auth: false,
                body: Some(json!({ "name": name, "user": user, "password": password })),
                pending: "Creating database...".into(),
                success: format!("Database '{name}' created successfully!"),
                action: "Failed to create database",
                render: Render::Nothing,
            },
            Command::Connect {
                name,
                user,
                password,
            } => Descriptor {
                method: Method::POST,
                path: "database/connect".into(),
                requires_auth: false,
                body: Some(json!({ "name": name, "user": user, "password": password })),
                pending: "Connecting to database...".into(),
                success: format!("Connected to database '{name}' successfully!"),
                action: "Failed to connect",
                render: Render::Token {
                    database: name.clone(),
                },
            },
            Command::ChangePassword {
                name,
                user,
                old_password,
                new_password,
            } => Descriptor {
                method: Method::POST,
                path: "database/change-password".into(),
                requires_auth: false,
                body: Some(json!({
                    "name": name,
                    "user": user,
                    "old_password": old_password,
                    "new_password": new_password,
                })),
                pending: "Changing database password...".into(),
                success: "Password changed successfully!".into(),
                action: "Failed to change password",
                render: Render::Notice(
                    "Important: You will need to connect again with the new password.",
                ),
            },
            Command::ListTables => Descriptor {
                method: Method::GET,
                path: "tables".into(),
                requires_auth: true,
                body: None,
                pending: "Fetching tables...".into(),
                success: "Tables fetched successfully!".into(),
                action: "Failed to fetch tables",
                render: Render::Tables,
            },
            Command::GetTable { table } => Descriptor {
                method: Method::GET,
                path: format!("table/{table}"),
                requires_auth: true,
                body: None,
                pending: format!("Getting data from table '{table}'..."),
                success: format!("Data from table '{table}' retrieved successfully!"),
                action: "Failed to get table data",
                render: Render::Value {
                    heading: "Current data:",
                },
            },
            Command::GetById { table, doc_id } => Descriptor {
                method: Method::GET,
                path: format!("table/{table}/doc/{doc_id}"),
                requires_auth: true,
                body: None,
                pending: format!("Fetching record with ID '{doc_id}' from table '{table}'..."),
                success: "Record fetched successfully!".into(),
                action: "Failed to fetch record",
                render: Render::IfPresent {
                    heading: "Record data:",
                    missing: Some(format!(
                        "No record found with ID '{doc_id}' in table '{table}'."
                    )),
                },
            },
            Command::Update {
                table,
                data,
                doc_id,
            } => {
                let data = parse_json(data, "data")?;
                Descriptor {
                    method: Method::POST,
                    path: format!("table/{table}/update"),
                    requires_auth: true,
                    body: Some(json!({ "data": data, "doc_id": doc_id })),
                    pending: format!("Updating record in table '{table}'..."),
                    success: format!("Record in table '{table}' updated successfully!"),
                    action: "Failed to update record",
                    render: Render::IfPresent {
                        heading: "Updated record:",
                        missing: None,
                    },
                }
            }
            Command::Persist { table, data } => {
                let data = parse_json(data, "data")?;
                Descriptor {
                    method: Method::POST,
                    path: format!("table/{table}/persist"),
                    requires_auth: true,
                    body: Some(json!({ "data": data })),
                    pending: format!("Persisting new data to table '{table}'..."),
                    success: format!("New data persisted to table '{table}' successfully!"),
                    action: "Failed to persist data to table",
                    render: Render::IfPresent {
                        heading: "Persisted data:",
                        missing: None,
                    },
                }
            }
            Command::History { table, limit } => {
                let limit = parse_limit(limit)?;
                Descriptor {
                    method: Method::GET,
                    path: format!("table/{table}/history?limit={limit}"),
                    requires_auth: true,
                    body: None,
                    pending: format!("Getting history from table '{table}'..."),
                    success: format!("History from table '{table}' retrieved successfully!"),
                    action: "Failed to get table history",
                    render: Render::Records {
                        heading: history_heading,
                        empty: "No records found in history.",
                    },
                }
            }
            Command::Find {
                table,
                criteria,
                limit,
                reverse,
            } => {
                let criteria = parse_json(criteria, "criteria")?;
                Descriptor {
                    method: Method::POST,
                    path: format!("table/{table}/find"),
                    requires_auth: true,
                    body: Some(search_body(criteria, limit, *reverse)?),
                    pending: format!("Searching records in table '{table}'..."),
                    success: format!("Search in table '{table}' completed successfully!"),
                    action: "Search failed",
                    render: Render::Records {
                        heading: results_heading,
                        empty: "No records found matching the provided criteria.",
                    },
                }
            }
            Command::FindAdvanced {
                table,
                criteria,
                limit,
                reverse,
            } => {
                let criteria = parse_json(criteria, "criteria")?;
                validate_advanced_criteria(&criteria)?;
                Descriptor {
                    method: Method::POST,
                    path: format!("table/{table}/find-advanced"),
                    requires_auth: true,
                    body: Some(search_body(criteria, limit, *reverse)?),
                    pending: format!("Performing advanced search in table '{table}'..."),
                    success: format!(
                        "Advanced search in table '{table}' completed successfully!"
                    ),
                    action: "Advanced search failed",
                    render: Render::Records {
                        heading: results_heading,
                        empty: "No records found matching the provided criteria.",
                    },
                }
            }
        };
        Ok(d)
    }
}

/// Validate, send and render one command.
pub fn run(client: &ApiClient, command: &Command, progress: &mut dyn Progress) -> CliResult<Report> {
    let descriptor = command.descriptor()?;
    progress.start(&descriptor.pending);
    let result = dispatch(client, descriptor);
    progress.finish();
    result
}

fn dispatch(client: &ApiClient, d: Descriptor) -> CliResult<Report> {
    if let Render::Token { .. } = d.render {
        let base = client.base_url();
        if !client.probe(&base) {
            return Err(CliError::ConnectionRefused { url: base });
        }
    }

    let envelope: Envelope =
        client.request(d.method.clone(), &d.path, d.body.as_ref(), d.requires_auth)?;
    debug!(success = envelope.success, "envelope decoded");
    if !envelope.success {
        return Err(rejected(d.action, envelope.message));
    }

    let mut report = Report::new(d.success);
    match d.render {
        Render::Nothing => {}
        Render::Notice(text) => report.lines.push(Line::Note(text.into())),
        Render::Value { heading } => {
            report.lines.push(Line::Heading(heading.into()));
            report.lines.push(Line::Json(envelope.data.unwrap_or(Value::Null)));
        }
        Render::IfPresent { heading, missing } => match envelope.data {
            Some(data) if truthy(Some(&data)) => {
                report.lines.push(Line::Heading(heading.into()));
                report.lines.push(Line::Json(data));
            }
            _ => report.lines.extend(missing.map(Line::Note)),
        },
        Render::Records { heading, empty } => {
            let records = match envelope.data {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            if records.is_empty() {
                report.lines.push(Line::Note(empty.into()));
            } else {
                report.lines.push(Line::Heading(heading(records.len())));
                for (i, record) in records.into_iter().enumerate() {
                    report.lines.push(Line::Label(format!("[Record {}]", i + 1)));
                    report.lines.push(Line::Json(record));
                }
            }
        }
        Render::Tables => {
            let tables = match envelope.data {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            if tables.is_empty() {
                report
                    .lines
                    .push(Line::Note("No tables found in the database.".into()));
            } else {
                report.lines.push(Line::Heading("Available tables:".into()));
                for (i, table) in tables.into_iter().enumerate() {
                    let name = match table {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    report.lines.push(Line::Item(i + 1, name));
                }
            }
        }
        Render::Token { database } => {
            let token = match envelope.data {
                Some(Value::String(token)) if !token.is_empty() => token,
                _ => return Err(rejected(d.action, envelope.message)),
            };
            client.credentials().save(&Credential { token, database })?;
        }
    }
    Ok(report)
}

fn rejected(action: &'static str, message: Option<String>) -> CliError {
    CliError::Rejected {
        action,
        message: message.unwrap_or_else(|| "Unknown error".into()),
    }
}
