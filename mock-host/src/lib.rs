//! Stand-in for a native host, serving scripted plugin completions over HTTP.
//!
//! `POST /exec` takes an outbound plugin command and answers with the list of
//! completions the host would have delivered for it, in order. Only the echo
//! plugin exists; anything else gets the host's "not found" answers.

use axum::{routing::post, Json, Router};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const ECHO_PLUGIN: &str = "mock::EchoPlugin";

const STATUS_OK: i32 = 1;
const STATUS_CLASS_NOT_FOUND: i32 = 2;
const STATUS_INVALID_ACTION: i32 = 7;
const STATUS_ERROR: i32 = 9;

const EXECUTION_ERROR: &str = "Plugin Execution Error";
const DEFAULT_STREAM_COUNT: u64 = 3;
const MAX_STREAM_COUNT: u64 = 1000;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub callback_id: String,
    pub class_name: String,
    pub method_name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub callback_id: String,
    pub status: i32,
    pub message: Value,
    pub keep_callback: bool,
}

impl Completion {
    fn single(cmd: &Command, status: i32, message: Value) -> Self {
        Self {
            callback_id: cmd.callback_id.clone(),
            status,
            message,
            keep_callback: false,
        }
    }
}

pub fn app() -> Router {
    Router::new().route("/exec", post(exec))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn exec(Json(cmd): Json<Command>) -> Json<Vec<Completion>> {
    info!("{}.{} ({})", cmd.class_name, cmd.method_name, cmd.callback_id);
    Json(dispatch(&cmd))
}

fn dispatch(cmd: &Command) -> Vec<Completion> {
    if cmd.class_name != ECHO_PLUGIN {
        return vec![Completion::single(cmd, STATUS_CLASS_NOT_FOUND, json!(EXECUTION_ERROR))];
    }
    match cmd.method_name.as_str() {
        "echo" => vec![Completion::single(cmd, STATUS_OK, cmd.arguments.clone())],
        "fail" => vec![Completion::single(cmd, STATUS_ERROR, cmd.arguments.clone())],
        "stream" => stream(cmd),
        _ => vec![Completion::single(cmd, STATUS_INVALID_ACTION, json!(EXECUTION_ERROR))],
    }
}

fn stream(cmd: &Command) -> Vec<Completion> {
    let count = cmd.arguments["count"]
        .as_u64()
        .unwrap_or(DEFAULT_STREAM_COUNT)
        .min(MAX_STREAM_COUNT);
    (0..count)
        .map(|index| Completion {
            callback_id: cmd.callback_id.clone(),
            status: STATUS_OK,
            message: json!({ "index": index }),
            keep_callback: index + 1 < count,
        })
        .collect()
}
