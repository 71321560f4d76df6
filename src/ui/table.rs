use tabled::{settings::Style, Table, Tabled};

use crate::reference::ReferenceRecord;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
pub struct RecordRow {
    #[tabled(rename = "Id")]
    pub id: i64,
    #[tabled(rename = "Type")]
    pub target_type: String,
    #[tabled(rename = "Target")]
    pub target_name: String,
    #[tabled(rename = "URL")]
    pub target_url: String,
}

impl From<&ReferenceRecord> for RecordRow {
    fn from(record: &ReferenceRecord) -> Self {
        Self {
            id: record.id,
            target_type: record.target_type.to_string(),
            target_name: record.target_name.clone(),
            target_url: record.target_url.clone(),
        }
    }
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &[(&str, String)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

pub fn records_table(records: &[ReferenceRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }
    let rows: Vec<RecordRow> = records.iter().map(RecordRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
