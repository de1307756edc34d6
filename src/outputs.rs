//! Recorder for metadata and observations of a run.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use serde_derive::*;
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Metadata {
    pub datatype: String,
    pub value: Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Observation {
    #[serde(rename = "trait")]
    pub trait_: String,
    pub method: String,
    pub scale: String,
    pub datatype: String,
    pub value: Value,
    pub label: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultFormat {
    Json,
    /// Long format: `sample,trait,value,label`.
    Csv,
}

impl ResultFormat {
    /// `.csv` paths are written as CSV, everything else as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ResultFormat::Csv,
            _ => ResultFormat::Json,
        }
    }
}

/// Observations keyed by sample, then variable.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Outputs {
    #[serde(default)]
    pub metadata: BTreeMap<String, Metadata>,
    #[serde(default)]
    pub observations: BTreeMap<String, BTreeMap<String, Observation>>,
}

impl Outputs {
    pub fn add_metadata(&mut self, term: &str, datatype: &str, value: Value) {
        self.metadata.insert(
            term.into(),
            Metadata {
                datatype: datatype.into(),
                value,
            },
        );
    }

    /// Record an observation, replacing any earlier value of
    /// the same variable for the sample.
    #[allow(clippy::too_many_arguments)]
    pub fn add_observation(
        &mut self,
        sample: &str,
        variable: &str,
        trait_: &str,
        method: &str,
        scale: &str,
        datatype: &str,
        value: Value,
        label: Value,
    ) {
        self.observations.entry(sample.into()).or_default().insert(
            variable.into(),
            Observation {
                trait_: trait_.into(),
                method: method.into(),
                scale: scale.into(),
                datatype: datatype.into(),
                value,
                label,
            },
        );
    }

    pub fn observation(&self, sample: &str, variable: &str) -> Option<&Observation> {
        self.observations.get(sample)?.get(variable)
    }

    pub fn clear(&mut self) {
        self.metadata.clear();
        self.observations.clear();
    }

    /// Our observations over the metadata of `previous`.
    /// Metadata terms we also hold are overridden.
    fn over(&self, previous: Outputs) -> Outputs {
        let mut metadata = previous.metadata;
        metadata.extend(self.metadata.clone());
        Outputs {
            metadata,
            observations: self.observations.clone(),
        }
    }

    /// Write the results to `path`.
    ///
    /// The metadata of an existing JSON results file is kept;
    /// its observations are replaced by ours.
    pub fn save_results(&self, path: &Path, format: ResultFormat) -> Result<()> {
        match format {
            ResultFormat::Json => {
                let previous = if path.is_file() {
                    let file = File::open(path)?;
                    serde_json::from_reader::<_, Outputs>(BufReader::new(file)).with_context(|| {
                        format!("existing results `{}` are not a results file", path.display())
                    })?
                } else {
                    Outputs::default()
                };

                let mut writer = BufWriter::new(create(path)?);
                serde_json::to_writer_pretty(&mut writer, &self.over(previous))?;
                writer.flush()?;
            }
            ResultFormat::Csv => {
                let mut writer = BufWriter::new(create(path)?);
                self.write_csv(&mut writer)?;
                writer.flush()?;
            }
        }
        Ok(())
    }

    fn write_csv<W: Write>(&self, w: &mut W) -> Result<()> {
        writeln!(w, "sample,trait,value,label")?;
        for (sample, vars) in self.observations.iter() {
            for (variable, obs) in vars.iter() {
                let rows: Vec<(&Value, &Value)> = match (&obs.value, &obs.label) {
                    (Value::Array(values), Value::Array(labels)) => values.iter().zip(labels).collect(),
                    (value, label) => vec![(value, label)],
                };
                for (value, label) in rows {
                    writeln!(
                        w,
                        "{},{},{},{}",
                        csv_field(sample),
                        csv_field(variable),
                        csv_field(&plain(value)),
                        csv_field(&plain(label))
                    )?;
                }
            }
        }
        Ok(())
    }
}

fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("could not create results file `{}`", path.display()))
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        v => v.to_string(),
    }
}

fn csv_field(s: &str) -> String {
    if s.contains(|c| matches!(c, ',' | '"' | '\n')) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
