//! In-process stand-in for the BioMutate server
//!
//! Keeps the session dataset as raw JSON and answers with the same bodies and
//! status codes the table viewer endpoints send, so responses go through the
//! real envelope parser.

#![allow(dead_code)]

use biomutate::services::api::parse_table_response;
use biomutate::services::{
    ApiError, ApiResponse, MissenseApi, MissenseInput, MissenseResults, TableViewerApi,
};
use futures::future::BoxFuture;
use reqwest::StatusCode;
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub const CONTAMINANT_PREFIX: &str = "contaminant_";

#[derive(Default)]
pub struct FakeServer {
    session: Mutex<Option<Value>>,
    calls: Mutex<Vec<String>>,
}

/// Example workbook: 120 proteins (every tenth a contaminant), 3 peptides, no scans
pub fn example_workbook() -> Value {
    let proteins: Vec<Value> = (0..120)
        .map(|i| {
            let locus = if i % 10 == 0 {
                format!("{CONTAMINANT_PREFIX}{i}")
            } else {
                format!("NP_{i:05}")
            };
            json!({"Locus": locus, "Score": i as f64 * 1.5, "Description": format!("protein {i}")})
        })
        .collect();
    let peptides: Vec<Value> = ["PEPTIDEK", "MISSENSER", "AAAK"]
        .iter()
        .map(|p| json!({"PeptideSequence": p, "Locus": "NP_00001"}))
        .collect();
    json!({
        "proteins": {"columns": ["Locus", "Score", "Description"], "data": proteins},
        "peptides": {"columns": ["PeptideSequence", "Locus"], "data": peptides},
        "scans": {"columns": ["ScanNum"], "data": []},
    })
}

fn ok_body(data: &Value, message: Option<&str>) -> String {
    let mut body = json!({"success": true, "data": data});
    if let Some(message) = message {
        body["message"] = json!(message);
    }
    body.to_string()
}

fn error_body(error: &str) -> String {
    json!({"error": error}).to_string()
}

fn reply(status: StatusCode, body: String) -> BoxFuture<'static, Result<ApiResponse, ApiError>> {
    Box::pin(async move { parse_table_response(status, &body) })
}

fn sheets_mut(data: &mut Value) -> &mut Map<String, Value> {
    data.as_object_mut().expect("workbook is an object")
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    /// Run `edit` on the session dataset and answer with the result
    fn transform(
        &self,
        message: &str,
        edit: impl FnOnce(&mut Map<String, Value>),
    ) -> BoxFuture<'static, Result<ApiResponse, ApiError>> {
        let mut session = self.session.lock().unwrap();
        match session.as_mut() {
            Some(data) => {
                edit(sheets_mut(data));
                reply(StatusCode::OK, ok_body(data, Some(message)))
            }
            None => reply(StatusCode::BAD_REQUEST, error_body("No data available")),
        }
    }
}

impl TableViewerApi for FakeServer {
    fn upload_data(&self, path: PathBuf) -> BoxFuture<'static, Result<ApiResponse, ApiError>> {
        self.record(format!("upload {}", path.display()));
        let is_excel = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
        if !is_excel {
            return reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Excel file format cannot be determined"),
            );
        }
        let data = example_workbook();
        *self.session.lock().unwrap() = Some(data.clone());
        reply(StatusCode::OK, ok_body(&data, None))
    }

    fn load_example(&self) -> BoxFuture<'static, Result<ApiResponse, ApiError>> {
        self.record("load-example");
        let data = example_workbook();
        *self.session.lock().unwrap() = Some(data.clone());
        reply(StatusCode::OK, ok_body(&data, None))
    }

    fn add_protein_id(&self) -> BoxFuture<'static, Result<ApiResponse, ApiError>> {
        self.record("add-protein-id");
        self.transform("Protein IDs added successfully", |sheets| {
            if let Some(proteins) = sheets.get_mut("proteins") {
                proteins["columns"]
                    .as_array_mut()
                    .unwrap()
                    .insert(1, json!("Protein ID"));
                for row in proteins["data"].as_array_mut().unwrap() {
                    let locus = row["Locus"].as_str().unwrap_or_default().to_string();
                    row["Protein ID"] = json!(locus.replace("NP_", "P"));
                }
            }
        })
    }

    fn add_genes(&self, sheets: Vec<String>) -> BoxFuture<'static, Result<ApiResponse, ApiError>> {
        self.record(format!("add-genes {}", sheets.join(",")));
        if sheets.is_empty() {
            return reply(StatusCode::BAD_REQUEST, error_body("No sheets selected"));
        }
        self.transform("Gene information added successfully", |data| {
            for name in &sheets {
                if let Some(sheet) = data.get_mut(name) {
                    sheet["columns"].as_array_mut().unwrap().push(json!("Gene"));
                    for row in sheet["data"].as_array_mut().unwrap() {
                        row["Gene"] = json!("TP53");
                    }
                }
            }
        })
    }

    fn remove_contaminants(
        &self,
        sheets: Vec<String>,
    ) -> BoxFuture<'static, Result<ApiResponse, ApiError>> {
        self.record(format!("remove-contaminants {}", sheets.join(",")));
        self.transform("Contaminants removed successfully", |data| {
            for name in &sheets {
                if let Some(sheet) = data.get_mut(name) {
                    sheet["data"].as_array_mut().unwrap().retain(|row| {
                        !row["Locus"]
                            .as_str()
                            .is_some_and(|l| l.starts_with(CONTAMINANT_PREFIX))
                    });
                }
            }
        })
    }

    fn download(&self, dir: PathBuf) -> BoxFuture<'static, Result<PathBuf, ApiError>> {
        self.record("download");
        let has_data = self.session.lock().unwrap().is_some();
        Box::pin(async move {
            if !has_data {
                return Err(ApiError::Server("No data available".to_string()));
            }
            let path = dir.join("filtered_data.xlsx");
            tokio::fs::write(&path, b"PK\x03\x04").await?;
            Ok(path)
        })
    }
}

impl MissenseApi for FakeServer {
    fn submit(&self, input: MissenseInput) -> BoxFuture<'static, Result<MissenseResults, ApiError>> {
        self.record(format!("missense {}", input.input_type()));
        Box::pin(async { Err(ApiError::Server("Missense analysis is not available".to_string())) })
    }
}
