//! Record output formats

use std::io::Write;
use std::str::FromStr;

use clickhouse_compact::{Record, Value};

use crate::Result;

/// How decoded records are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Tab-separated values with a header line
    Tsv,
}

impl FromStr for OutputFormat {
    type Err = crate::CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" | "jsonl" | "ndjson" => Ok(Self::Json),
            "tsv" | "tabseparated" => Ok(Self::Tsv),
            other => Err(crate::CliError::Config(format!(
                "Unknown output format '{other}', expected json or tsv"
            ))),
        }
    }
}

/// Writes records to an output stream in one format
#[derive(Debug)]
pub struct RecordWriter<W: Write> {
    out: W,
    format: OutputFormat,
    header_written: bool,
}

impl<W: Write> RecordWriter<W> {
    pub const fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            header_written: false,
        }
    }

    /// Write one record.
    ///
    /// For TSV the column names are written before the first record.
    pub fn write(&mut self, record: &Record) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, &record.to_json()?)?;
                writeln!(self.out)?;
            }
            OutputFormat::Tsv => {
                if !self.header_written {
                    let header: Vec<String> = record.names().iter().map(|n| escape_tsv(n)).collect();
                    writeln!(self.out, "{}", header.join("\t"))?;
                    self.header_written = true;
                }
                let fields: Vec<String> = record.values().iter().map(tsv_field).collect();
                writeln!(self.out, "{}", fields.join("\t"))?;
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn tsv_field(value: &Value) -> String {
    match value {
        Value::Null => "\\N".to_string(),
        other => escape_tsv(&other.to_string()),
    }
}

fn escape_tsv(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\0' => escaped.push_str("\\0"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn record() -> Record {
        let names: Arc<[String]> = vec!["id".to_string(), "tag".to_string()].into();
        Record::new(names, vec![Value::UInt64(1), Value::String("a\tb".into())])
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TSV".parse::<OutputFormat>().unwrap(), OutputFormat::Tsv);
        assert_eq!("ndjson".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        let err = "csv".parse::<OutputFormat>().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("csv"));
    }

    #[test]
    fn test_json_lines() {
        let mut writer = RecordWriter::new(Vec::new(), OutputFormat::Json);
        writer.write(&record()).unwrap();
        writer.write(&record()).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"id":1,"tag":"a\tb"}"#);
    }

    #[test]
    fn test_tsv_header_once() {
        let mut writer = RecordWriter::new(Vec::new(), OutputFormat::Tsv);
        writer.write(&record()).unwrap();
        writer.write(&record()).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text, "id\ttag\n1\ta\\tb\n1\ta\\tb\n");
    }

    #[test]
    fn test_tsv_null_and_escapes() {
        assert_eq!(tsv_field(&Value::Null), "\\N");
        assert_eq!(escape_tsv("a\\b\nc\0"), "a\\\\b\\nc\\0");
    }

    #[test]
    fn test_json_rejects_non_finite_float() {
        let names: Arc<[String]> = vec!["x".to_string()].into();
        let record = Record::new(names, vec![Value::Float64(f64::NAN)]);
        let mut writer = RecordWriter::new(Vec::new(), OutputFormat::Json);
        let err = writer.write(&record).unwrap_err();
        assert!(err.is_decode());
    }
}
