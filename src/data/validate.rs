use std::collections::HashSet;
use std::fmt;
use std::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }
}

/// Diagnostic pass over the units and breakpoints files. Unlike
/// [crate::data::roster::Roster::load], which stops at the first fault, this
/// reports every issue it can find in one sweep.
pub fn validate_roster_files(
    units_path: &str,
    breakpoints_path: &str,
) -> Result<ValidationReport, String> {
    let unit_rows = read_rows(units_path)?;
    let breakpoint_rows = read_rows(breakpoints_path)?;

    let mut report = ValidationReport::default();
    let mut seen_units = HashSet::new();
    let mut vocabulary = HashSet::new();

    for (line, fields) in &unit_rows {
        let context = format!("units[{line}]");
        let name = fields.first().map(String::as_str).unwrap_or("");
        if name.is_empty() {
            report.push(ValidationSeverity::Error, context.clone(), "missing unit name");
        } else if !seen_units.insert(name.to_string()) {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.name"),
                format!("duplicate unit '{name}'"),
            );
        }

        match fields.get(1).map(String::as_str) {
            Some(raw) if raw.parse::<u32>().is_ok() => {}
            Some(raw) => report.push(
                ValidationSeverity::Error,
                format!("{context}.cost"),
                format!("cost '{raw}' is not a non-negative integer"),
            ),
            None => report.push(
                ValidationSeverity::Error,
                format!("{context}.cost"),
                "missing cost field",
            ),
        }

        let traits = &fields[fields.len().min(2)..];
        if traits.is_empty() {
            report.push(
                ValidationSeverity::Info,
                context.clone(),
                format!("unit '{name}' carries no traits"),
            );
        }
        let mut seen_traits = HashSet::new();
        for (slot, trait_name) in traits.iter().enumerate() {
            let trait_context = format!("{context}.trait[{slot}]");
            if trait_name.is_empty() {
                report.push(ValidationSeverity::Error, trait_context, "empty trait slot");
                continue;
            }
            if !seen_traits.insert(trait_name.as_str()) {
                report.push(
                    ValidationSeverity::Warning,
                    trait_context,
                    format!("trait '{trait_name}' repeated on unit '{name}'; counted once"),
                );
            }
            vocabulary.insert(trait_name.to_string());
        }
    }

    let mut covered = HashSet::new();
    for (line, fields) in &breakpoint_rows {
        let context = format!("breakpoints[{line}]");
        let trait_name = fields.first().map(String::as_str).unwrap_or("");
        if trait_name.is_empty() {
            report.push(ValidationSeverity::Error, context.clone(), "missing trait name");
            continue;
        }
        if !covered.insert(trait_name.to_string()) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("duplicate breakpoint row for trait '{trait_name}'"),
            );
        }
        for (slot, raw) in fields[1..].iter().enumerate() {
            if raw.parse::<u32>().is_err() {
                report.push(
                    ValidationSeverity::Error,
                    format!("{context}.breakpoint[{slot}]"),
                    format!("breakpoint '{raw}' is not a non-negative integer"),
                );
            }
        }
    }

    for trait_name in &vocabulary {
        if !covered.contains(trait_name) {
            report.push(
                ValidationSeverity::Error,
                "breakpoints",
                format!("trait '{trait_name}' is carried by a unit but has no breakpoint row"),
            );
        }
    }
    for trait_name in &covered {
        if !vocabulary.contains(trait_name) {
            report.push(
                ValidationSeverity::Error,
                "breakpoints",
                format!("breakpoint row '{trait_name}' matches no unit trait"),
            );
        }
    }

    Ok(report)
}

fn read_rows(path: &str) -> Result<Vec<(usize, Vec<String>)>, String> {
    let raw = fs::read_to_string(path).map_err(|err| format!("unable to read '{path}': {err}"))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|err| format!("unable to parse '{path}': {err}"))?;
        rows.push((index + 1, record.iter().map(str::to_string).collect()));
    }
    Ok(rows)
}
