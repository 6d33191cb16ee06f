use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Form, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const API_VERSION: &str = "2.0";
pub const ROOT_NODE: &str = "defensio-result";
pub const DEFAULT_KEY: &str = "test-key";

const SPAM_MARKERS: [&str; 4] = ["viagra", "casino", "cheap watches", "free money"];
const PROFANITY: [&str; 3] = ["damn", "crap", "heck"];
const MAX_STATS_DAYS: i64 = 366;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub signature: String,
    pub allow: bool,
    pub classification: String,
    pub spaminess: f64,
    #[serde(rename = "profanity-match")]
    pub profanity_match: bool,
}

#[derive(Debug, Default)]
pub struct Service {
    keys: HashSet<String>,
    documents: HashMap<String, StoredDocument>,
}

pub type Db = Arc<RwLock<Service>>;

type Reply = (StatusCode, Json<Value>);

/// Router accepting only `DEFAULT_KEY`.
pub fn app() -> Router {
    app_with_keys([DEFAULT_KEY])
}

pub fn app_with_keys<I, K>(keys: I) -> Router
where
    I: IntoIterator<Item = K>,
    K: Into<String>,
{
    let db: Db = Arc::new(RwLock::new(Service {
        keys: keys.into_iter().map(Into::into).collect(),
        documents: HashMap::new(),
    }));
    Router::new()
        .route("/2.0/users/{key}", get(user))
        .route("/2.0/users/{key}/{action}", get(account_get).post(account_post))
        .route(
            "/2.0/users/{key}/documents/{signature}",
            get(get_document).put(put_document),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_keys(listener: TcpListener, keys: Vec<String>) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_keys(keys)).await
}

/// Wrap `fields` in the envelope with the common header fields.
fn envelope(status: StatusCode, service_status: &str, message: Option<&str>, fields: Value) -> Reply {
    let mut payload = Map::new();
    payload.insert("api-version".to_string(), json!(API_VERSION));
    payload.insert("status".to_string(), json!(service_status));
    payload.insert("message".to_string(), json!(message));
    if let Value::Object(fields) = fields {
        payload.extend(fields);
    }
    (status, Json(json!({ ROOT_NODE: payload })))
}

fn success(fields: Value) -> Reply {
    envelope(StatusCode::OK, "success", None, fields)
}

fn fail(status: StatusCode, message: &str) -> Reply {
    envelope(status, "fail", Some(message), json!({}))
}

/// `segment` without its `.json` suffix.
fn strip_format(segment: &str) -> Result<&str, Reply> {
    segment
        .strip_suffix(".json")
        .ok_or_else(|| fail(StatusCode::NOT_ACCEPTABLE, "only the json format is supported"))
}

fn authorize(service: &Service, key: &str) -> Result<(), Reply> {
    if service.keys.contains(key) {
        Ok(())
    } else {
        Err(fail(StatusCode::UNAUTHORIZED, "API key not found"))
    }
}

fn document_reply(document: &StoredDocument) -> Reply {
    success(serde_json::to_value(document).unwrap_or_default())
}

fn classify(content: &str) -> StoredDocument {
    let lowered = content.to_lowercase();
    let spam = SPAM_MARKERS.iter().any(|marker| lowered.contains(marker));
    let profanity_match = lowered
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| PROFANITY.contains(&word));
    StoredDocument {
        signature: Uuid::new_v4().simple().to_string(),
        allow: !spam,
        classification: if spam { "spam" } else { "legitimate" }.to_string(),
        spaminess: if spam { 0.95 } else { 0.05 },
        profanity_match,
    }
}

fn mask_profanity(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word = String::new();
    let flush = |word: &mut String, out: &mut String| {
        if PROFANITY.contains(&word.to_lowercase().as_str()) {
            out.extend(std::iter::repeat('*').take(word.chars().count()));
        } else {
            out.push_str(word);
        }
        word.clear();
    };
    for c in text.chars() {
        if c.is_alphanumeric() {
            word.push(c);
        } else {
            flush(&mut word, &mut out);
            out.push(c);
        }
    }
    flush(&mut word, &mut out);
    out
}

fn parse_day(params: &HashMap<String, String>, name: &str) -> Result<NaiveDate, Reply> {
    params
        .get(name)
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .ok_or_else(|| fail(StatusCode::BAD_REQUEST, &format!("{name} must be a YYYY-MM-DD date")))
}

async fn user(State(db): State<Db>, Path(key): Path<String>) -> Reply {
    let service = db.read().await;
    let key = match strip_format(&key) {
        Ok(key) => key,
        Err(reply) => return reply,
    };
    if let Err(reply) = authorize(&service, key) {
        return reply;
    }
    success(json!({ "owner-url": format!("http://example.com/{key}") }))
}

async fn account_get(
    State(db): State<Db>,
    Path((key, action)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    let service = db.read().await;
    if let Err(reply) = authorize(&service, &key) {
        return reply;
    }
    match strip_format(&action) {
        Ok("basic-stats") => basic_stats(&service),
        Ok("extended-stats") => extended_stats(&params).unwrap_or_else(|reply| reply),
        Ok(_) => fail(StatusCode::NOT_FOUND, "unknown action"),
        Err(reply) => reply,
    }
}

fn basic_stats(service: &Service) -> Reply {
    let unwanted = service.documents.values().filter(|d| !d.allow).count();
    let legitimate = service.documents.len() - unwanted;
    success(json!({
        "unwanted": { "total": unwanted, "spam": unwanted, "malicious": 0 },
        "legitimate": { "total": legitimate },
        "false-negatives": 0,
        "false-positives": 0,
        "accuracy": 1.0,
        "learning": false,
    }))
}

fn extended_stats(params: &HashMap<String, String>) -> Result<Reply, Reply> {
    let from = parse_day(params, "from")?;
    let to = parse_day(params, "to")?;
    let days = (to - from).num_days();
    if days > MAX_STATS_DAYS {
        return Err(fail(StatusCode::BAD_REQUEST, "date range too large"));
    }
    let data: Vec<Value> = from
        .iter_days()
        .take_while(|day| *day <= to)
        .map(|day| {
            json!({
                "date": day.format("%Y-%m-%d").to_string(),
                "legitimate": 0,
                "unwanted": 0,
                "false-positives": 0,
                "false-negatives": 0,
                "accuracy": 1.0,
            })
        })
        .collect();
    Ok(success(json!({ "data": data })))
}

async fn account_post(
    State(db): State<Db>,
    Path((key, action)): Path<(String, String)>,
    Form(fields): Form<HashMap<String, String>>,
) -> Reply {
    let mut service = db.write().await;
    if let Err(reply) = authorize(&service, &key) {
        return reply;
    }
    match strip_format(&action) {
        Ok("documents") => create_document(&mut service, &fields),
        Ok("profanity-filter") => {
            let filtered: Map<String, Value> = fields
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(mask_profanity(v))))
                .collect();
            success(json!({ "filtered": filtered }))
        }
        Ok(_) => fail(StatusCode::NOT_FOUND, "unknown action"),
        Err(reply) => reply,
    }
}

fn create_document(service: &mut Service, fields: &HashMap<String, String>) -> Reply {
    let content = match fields.get("content") {
        Some(content) if !content.is_empty() => content,
        _ => return fail(StatusCode::BAD_REQUEST, "content is required"),
    };
    let document = classify(content);
    tracing::debug!(signature = %document.signature, classification = %document.classification, "document created");
    let reply = document_reply(&document);
    service.documents.insert(document.signature.clone(), document);
    reply
}

async fn get_document(
    State(db): State<Db>,
    Path((key, signature)): Path<(String, String)>,
) -> Reply {
    let service = db.read().await;
    if let Err(reply) = authorize(&service, &key) {
        return reply;
    }
    let signature = match strip_format(&signature) {
        Ok(signature) => signature,
        Err(reply) => return reply,
    };
    match service.documents.get(signature) {
        Some(document) => document_reply(document),
        None => fail(StatusCode::NOT_FOUND, "document not found"),
    }
}

async fn put_document(
    State(db): State<Db>,
    Path((key, signature)): Path<(String, String)>,
    Form(fields): Form<HashMap<String, String>>,
) -> Reply {
    let mut service = db.write().await;
    if let Err(reply) = authorize(&service, &key) {
        return reply;
    }
    let signature = match strip_format(&signature) {
        Ok(signature) => signature,
        Err(reply) => return reply,
    };
    let allow = match fields.get("allow").map(String::as_str) {
        Some("true") => Some(true),
        Some("false") => Some(false),
        Some(_) => return fail(StatusCode::BAD_REQUEST, "allow must be true or false"),
        None => None,
    };
    let Some(document) = service.documents.get_mut(signature) else {
        return fail(StatusCode::NOT_FOUND, "document not found");
    };
    if let Some(allow) = allow {
        document.allow = allow;
    }
    document_reply(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spam_markers_are_unwanted() {
        let document = classify("Get CHEAP WATCHES now");
        assert!(!document.allow);
        assert_eq!(document.classification, "spam");
        assert_eq!(document.signature.len(), 32);
    }

    #[test]
    fn ordinary_content_is_legitimate() {
        let document = classify("This is a simple test");
        assert!(document.allow);
        assert_eq!(document.classification, "legitimate");
        assert!(!document.profanity_match);
    }

    #[test]
    fn profanity_is_detected_on_word_boundaries() {
        assert!(classify("well, damn.").profanity_match);
        assert!(!classify("damnation").profanity_match);
    }

    #[test]
    fn masking_keeps_length_and_punctuation() {
        assert_eq!(mask_profanity("oh Damn, that's crap!"), "oh ****, that's ****!");
        assert_eq!(mask_profanity("hello world"), "hello world");
    }

    #[test]
    fn document_serializes_with_service_field_names() {
        let json = serde_json::to_value(classify("hello")).unwrap();
        assert!(json.get("profanity-match").is_some());
        assert!(json.get("spaminess").is_some());
    }

    #[test]
    fn strip_format_requires_json() {
        assert_eq!(strip_format("abc.json").unwrap(), "abc");
        assert!(strip_format("abc.xml").is_err());
    }
}
