use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::client::ServiceClient;
use crate::api::error::ApiError;

/// Payload shape shared by the stateful procedures: they return normally
/// with `success: false` when the business rule rejects the call.
#[derive(Debug, Default, Deserialize)]
pub struct RpcStatus {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub tables: Option<i32>,
}

pub struct RegisterMatchParams<'a> {
    pub tournament_id: &'a str,
    pub round: i32,
    pub white: &'a str,
    pub black: &'a str,
    pub result_white: f64,
    pub result_black: f64,
    pub referee_id: &'a str,
    pub is_walkover: bool,
}

impl ServiceClient {
    /// Invoke a named procedure, surfacing transport and status errors
    /// but leaving the payload to the caller.
    pub async fn rpc(&self, function: &str, params: Value) -> Result<Value, ApiError> {
        let url = self.rpc_url(function);
        let response = self.send(self.post(&url).json(&params)).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Invoke a procedure that reports `{success, error}`; a business
    /// failure becomes an error carrying the returned message verbatim.
    pub async fn rpc_checked(&self, function: &str, params: Value) -> Result<RpcStatus, ApiError> {
        let value = self.rpc(function, params).await?;
        let status: RpcStatus = serde_json::from_value(value)?;
        if !status.success {
            let message = status
                .error
                .clone()
                .unwrap_or_else(|| "operação recusada pelo serviço".to_string());
            return Err(ApiError::Business(message));
        }
        Ok(status)
    }

    pub async fn checkin_week(&self, week_id: &str) -> Result<RpcStatus, ApiError> {
        self.rpc_checked("checkin_tournament", json!({ "p_tournament_week_id": week_id }))
            .await
    }

    pub async fn cancel_checkin(&self, week_id: &str) -> Result<RpcStatus, ApiError> {
        self.rpc_checked("cancel_checkin", json!({ "p_tournament_week_id": week_id }))
            .await
    }

    pub async fn link_player(&self, player_id: &str) -> Result<(), ApiError> {
        self.rpc("link_player_to_user", json!({ "p_player_id": player_id }))
            .await?;
        Ok(())
    }

    pub async fn register_match(&self, params: RegisterMatchParams<'_>) -> Result<(), ApiError> {
        self.rpc(
            "register_match",
            json!({
                "p_tournament_id": params.tournament_id,
                "p_round": params.round,
                "p_white": params.white,
                "p_black": params.black,
                "p_result_white": params.result_white,
                "p_result_black": params.result_black,
                "p_referee_id": params.referee_id,
                "p_is_walkover": params.is_walkover,
            }),
        )
        .await?;
        Ok(())
    }

    pub async fn rollback_match(
        &self,
        match_id: &str,
        referee_id: &str,
        reason: Option<&str>,
    ) -> Result<(), ApiError> {
        self.rpc(
            "rollback_match",
            json!({
                "p_match_id": match_id,
                "p_referee_id": referee_id,
                "p_reason": reason,
            }),
        )
        .await?;
        Ok(())
    }

    pub async fn create_week(
        &self,
        tournament_id: &str,
        week_number: i32,
        match_date: &str,
        max_players: i32,
    ) -> Result<Value, ApiError> {
        self.rpc(
            "create_tournament_week",
            json!({
                "p_tournament_id": tournament_id,
                "p_week_number": week_number,
                "p_match_date": match_date,
                "p_max_players": max_players,
            }),
        )
        .await
    }

    /// Generate the week's pairings; on success the payload reports how
    /// many tables were created.
    pub async fn generate_pairings(&self, week_id: &str) -> Result<RpcStatus, ApiError> {
        self.rpc_checked("generate_pairings", json!({ "p_tournament_week_id": week_id }))
            .await
    }

    /// Email every participant after pairings are generated. Reported
    /// separately by the caller: a failure here must not undo the
    /// generation itself.
    pub async fn notify_pairings(&self, week_id: &str) -> Result<(), ApiError> {
        let url = self.functions_url("notify-pairings");
        let body = json!({ "tournament_week_id": week_id });
        self.send(self.post(&url).json(&body)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_status_defaults_to_failure() {
        let status: RpcStatus = serde_json::from_value(json!({})).unwrap();
        assert!(!status.success);
        assert!(status.error.is_none());
    }

    #[test]
    fn rpc_status_carries_table_count() {
        let status: RpcStatus =
            serde_json::from_value(json!({ "success": true, "tables": 9 })).unwrap();
        assert!(status.success);
        assert_eq!(status.tables, Some(9));
    }
}
