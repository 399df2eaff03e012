//! enunit Server
//!
//! Line-delimited JSON-RPC 2.0 over stdin/stdout, backed by the standard
//! unit space.
//!
//! Methods:
//! - ping: Liveness check
//! - convert: Convert an amount between two units
//! - factor: Conversion factor between two units
//! - parse: Parse a unit string into its basis
//! - format: Render a basis as a unit string
//! - resolve: Express an amount of a unit in base units
//! - units/list: List registered unit names
//!
//! Environment:
//! - RUST_LOG: log filter (default: info), logs go to stderr
//! - ENUNIT_UNITS_PATH: JSON array of extra unit definitions to register

use enunit::{Basis, UnitDef, UnitError, UnitSpace};
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const SERVER_NAME: &str = "enunit";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Path of the extra unit definitions, if configured
fn units_path() -> Option<PathBuf> {
    env::var_os("ENUNIT_UNITS_PATH").map(PathBuf::from)
}

/// Read a JSON array of unit definitions
fn load_unit_defs(path: &Path) -> Result<Vec<UnitDef>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("Invalid unit definitions in '{}': {}", path.display(), e))
}

/// Standard catalogue plus the extra units in `path`, registered after it
fn create_space(path: Option<&Path>) -> Result<UnitSpace, String> {
    let mut space = enunit::standard().map_err(|e| e.to_string())?;

    if let Some(path) = path {
        let defs = load_unit_defs(path)?;
        space.load_defs(&defs).map_err(|e| format!("Failed to register units from '{}': {}", path.display(), e))?;
        info!(count = defs.len(), path = %path.display(), "loaded extra unit definitions");
    }

    Ok(space)
}

// JSON-RPC protocol types
#[derive(Debug, Deserialize)]
struct RpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<JsonValue>,
    method: String,
    #[serde(default)]
    params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
struct RpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
struct RpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<JsonValue>,
}

impl RpcError {
    fn parse_error(message: impl Into<String>) -> Self {
        RpcError { code: -32700, message: message.into(), data: None }
    }

    fn method_not_found(method: &str) -> Self {
        RpcError { code: -32601, message: format!("Method not found: {}", method), data: None }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        RpcError { code: -32602, message: message.into(), data: None }
    }
}

impl From<UnitError> for RpcError {
    fn from(e: UnitError) -> Self {
        RpcError {
            code: -32000,
            message: e.to_string(),
            data: Some(json!(e.report())),
        }
    }
}

impl RpcResponse {
    fn new(id: Option<JsonValue>, result: Result<JsonValue, RpcError>) -> Self {
        match result {
            Ok(r) => RpcResponse { jsonrpc: "2.0".to_string(), id, result: Some(r), error: None },
            Err(e) => RpcResponse { jsonrpc: "2.0".to_string(), id, result: None, error: Some(e) },
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(io::stderr)
        .init();

    let space = match create_space(units_path().as_deref()) {
        Ok(space) => space,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(version = SERVER_VERSION, units = space.len(), "{} server started", SERVER_NAME);

    let stdin = io::stdin();
    let reader = io::BufReader::new(stdin.lock());

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Error reading input: {}", e);
                return ExitCode::FAILURE;
            }
        };

        let Some(response) = handle_line(&space, &line) else {
            continue;
        };

        let response_json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                error!("Error serializing response: {}", e);
                continue;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", response_json).and_then(|_| stdout.flush()) {
            error!("Error writing response: {}", e);
            return ExitCode::FAILURE;
        }
    }

    info!("Client disconnected (EOF), shutting down");
    ExitCode::SUCCESS
}

/// Handle one input line. `None` when nothing should be written back
/// (blank lines and notifications).
fn handle_line(space: &UnitSpace, line: &str) -> Option<RpcResponse> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    debug!("Received: {} bytes", line.len());

    let request: RpcRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            warn!("Error parsing request: {}", e);
            return Some(RpcResponse::new(None, Err(RpcError::parse_error(format!("Parse error: {}", e)))));
        }
    };

    let result = handle_request(space, &request.method, request.params);

    // Notifications (no id) never receive a response
    if request.id.is_none() {
        debug!("Notification processed (no response): {}", request.method);
        return None;
    }

    if let Err(e) = &result {
        debug!(method = %request.method, code = e.code, "request failed: {}", e.message);
    }
    Some(RpcResponse::new(request.id, result))
}

fn handle_request(space: &UnitSpace, method: &str, params: Option<JsonValue>) -> Result<JsonValue, RpcError> {
    match method {
        "ping" => Ok(json!({})),
        "convert" => handle_convert(space, params_of(params)?),
        "factor" => handle_factor(space, params_of(params)?),
        "parse" => handle_parse(params_of(params)?),
        "format" => handle_format(params_of(params)?),
        "resolve" => handle_resolve(space, params_of(params)?),
        "units/list" => Ok(json!({ "units": space.units() })),
        _ => Err(RpcError::method_not_found(method)),
    }
}

/// Decode method params into their typed form
fn params_of<T: DeserializeOwned>(params: Option<JsonValue>) -> Result<T, RpcError> {
    let params = params.ok_or_else(|| RpcError::invalid_params("Missing params"))?;
    serde_json::from_value(params).map_err(|e| RpcError::invalid_params(format!("Invalid params: {}", e)))
}

#[derive(Debug, Deserialize)]
struct ConvertParams {
    amount: f64,
    from: String,
    to: String,
}

#[derive(Debug, Deserialize)]
struct FactorParams {
    from: String,
    to: String,
}

#[derive(Debug, Deserialize)]
struct UnitParams {
    unit: String,
    #[serde(default = "default_amount")]
    amount: f64,
}

fn default_amount() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct FormatParams {
    basis: Basis,
}

fn handle_convert(space: &UnitSpace, params: ConvertParams) -> Result<JsonValue, RpcError> {
    let value = space.quantity(params.amount, &params.from)?.as_unit(&params.to)?;
    Ok(json!({ "value": value, "from": params.from, "to": params.to }))
}

fn handle_factor(space: &UnitSpace, params: FactorParams) -> Result<JsonValue, RpcError> {
    let factor = space.conversion_factor(&params.from, &params.to)?;
    Ok(json!({ "factor": factor }))
}

fn handle_parse(params: UnitParams) -> Result<JsonValue, RpcError> {
    let basis = enunit::parse_unit_string(&params.unit)?;
    Ok(json!({ "basis": basis, "formatted": basis.to_string() }))
}

fn handle_format(params: FormatParams) -> Result<JsonValue, RpcError> {
    Ok(json!({ "formatted": enunit::format_unit_string(&params.basis) }))
}

fn handle_resolve(space: &UnitSpace, params: UnitParams) -> Result<JsonValue, RpcError> {
    let quantity = space.quantity(params.amount, &params.unit)?;
    Ok(json!({
        "factor": quantity.factor(),
        "basis": quantity.basis(),
        "display": quantity.to_string()
    }))
}
