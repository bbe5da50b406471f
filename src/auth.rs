//! 認証クライアント
//!
//! `POST {base}/login` と `POST {base}/register` を呼び、成功時に
//! トークンとユーザーIDをストレージへ保存する。

use crate::error::{PlantScanError, Result};
use crate::storage::{Storage, TOKEN, USER_ID};
use log::info;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// 送信するJSON本文
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn login(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { name: None, email: email.into(), password: password.into() }
    }

    pub fn register(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self { name: Some(name.into()), email: email.into(), password: password.into() }
    }

    fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(PlantScanError::Auth("メールアドレスとパスワードを入力してください".into()));
        }
        if matches!(&self.name, Some(n) if n.trim().is_empty()) {
            return Err(PlantScanError::Auth("名前を入力してください".into()));
        }
        Ok(())
    }
}

/// 認証成功時の情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user_id: String,
}

/// 認証APIの応答を解釈
///
/// 成功: `{token, user: {id}}`（idは文字列・数値どちらも可）
/// 失敗: `message` / `error` フィールド、無ければ本文そのもの
pub fn parse_auth_response(status: u16, body: &str) -> Result<AuthSession> {
    let json: Value = serde_json::from_str(body).unwrap_or(Value::Null);

    if (200..300).contains(&status) {
        let token = json.get("token").and_then(Value::as_str).filter(|t| !t.is_empty());
        let user_id = json.pointer("/user/id").and_then(|id| match id {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        if let (Some(token), Some(user_id)) = (token, user_id) {
            return Ok(AuthSession { token: token.to_string(), user_id });
        }
    }

    let message = ["message", "error"]
        .iter()
        .find_map(|k| json.get(*k).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                body.trim().to_string()
            }
        });
    Err(PlantScanError::Auth(message))
}

/// 認証APIクライアント
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
    storage: Arc<Storage>,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>, storage: Arc<Storage>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into(), storage }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        self.post("login", &Credentials::login(email, password)).await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthSession> {
        self.post("register", &Credentials::register(name, email, password)).await
    }

    async fn post(&self, path: &str, credentials: &Credentials) -> Result<AuthSession> {
        credentials.validate()?;
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let response = self.client.post(&url).json(credentials).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let session = parse_auth_response(status, &body)?;
        store_session(&self.storage, &session)?;
        info!("signed in as user {}", session.user_id);
        Ok(session)
    }
}

/// トークンとユーザーIDを保存
pub fn store_session(storage: &Storage, session: &AuthSession) -> Result<()> {
    storage.set(&TOKEN, &session.token)?;
    storage.set(&USER_ID, &session.user_id)
}

/// ログアウト: トークンとユーザーIDを削除
pub fn logout(storage: &Storage) -> Result<()> {
    storage.delete(&TOKEN)?;
    storage.delete(&USER_ID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_success_numeric_id() {
        let session = parse_auth_response(200, r#"{"token":"t1","user":{"id":42}}"#).unwrap();
        assert_eq!(session, AuthSession { token: "t1".into(), user_id: "42".into() });
    }

    #[test]
    fn test_parse_error_message() {
        let err = parse_auth_response(401, r#"{"message":"Invalid credentials"}"#).unwrap_err();
        assert_eq!(err.to_string(), "認証エラー: Invalid credentials");

        let err = parse_auth_response(400, r#"{"error":"Email taken"}"#).unwrap_err();
        assert!(err.to_string().contains("Email taken"));

        let err = parse_auth_response(502, "").unwrap_err();
        assert!(err.to_string().contains("HTTP 502"));
    }

    #[test]
    fn test_parse_success_without_token_is_error() {
        assert!(parse_auth_response(200, r#"{"user":{"id":"u"}}"#).is_err());
    }

    #[test]
    fn test_credentials_json() {
        let login = serde_json::to_value(Credentials::login("a@b.c", "pw")).unwrap();
        assert!(login.get("name").is_none());
        let register = serde_json::to_value(Credentials::register("Asha", "a@b.c", "pw")).unwrap();
        assert_eq!(register["name"], "Asha");
    }

    #[test]
    fn test_store_and_logout() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path().join("s.json"));
        store_session(&storage, &AuthSession { token: "t".into(), user_id: "u".into() }).unwrap();
        assert_eq!(storage.get(&USER_ID).as_deref(), Some("u"));

        logout(&storage).unwrap();
        assert_eq!(storage.get(&TOKEN), None);
        assert_eq!(storage.get(&USER_ID), None);
    }
}
