use crate::gui_bridge::model::DisplayModel;
use crate::prompt::is_hex_color;
use anyhow::Context;
use log::info;
use serde::Deserialize;
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use warp::{
    http::StatusCode,
    reply::{Json, WithStatus},
    Filter,
};
use wifiidcore::cycle::CycleOutcome;
use wifiidcore::prelude::{ScanError, ScanResult};
use wifiidcore::ScanCycleController;

type SharedModel = Arc<RwLock<DisplayModel>>;

#[derive(Debug, Deserialize)]
struct IgnoreRequest {
    ssid: String,
}

#[derive(Debug, Deserialize)]
struct KnownRequest {
    bssid: String,
    ssid: String,
    color: String,
}

fn read(state: &SharedModel) -> RwLockReadGuard<'_, DisplayModel> {
    state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write(state: &SharedModel) -> RwLockWriteGuard<'_, DisplayModel> {
    state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn status_for(err: &ScanError) -> StatusCode {
    match err {
        ScanError::Validation(_) => StatusCode::BAD_REQUEST,
        ScanError::Provider(_) => StatusCode::BAD_GATEWAY,
        ScanError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        ScanError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_reply(err: &ScanError) -> WithStatus<Json> {
    warp::reply::with_status(
        warp::reply::json(&json!({"status": "error", "message": err.to_string()})),
        status_for(err),
    )
}

async fn trigger_scan(
    state: SharedModel,
    controller: Arc<ScanCycleController>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    let outcome = controller.run_cycle().await;
    write(&state).apply(&outcome);

    let reply = match &outcome {
        Ok(CycleOutcome::Completed(report)) => warp::reply::with_status(
            warp::reply::json(&json!({
                "status": "ok",
                "networks": report.networks.len(),
                "suspicious": report.suspicious.len(),
            })),
            StatusCode::OK,
        ),
        Ok(CycleOutcome::Empty) => warp::reply::with_status(
            warp::reply::json(&json!({"status": "empty"})),
            StatusCode::OK,
        ),
        Ok(CycleOutcome::Skipped) => warp::reply::with_status(
            warp::reply::json(&json!({"status": "busy"})),
            StatusCode::CONFLICT,
        ),
        Err(err) => error_reply(err),
    };
    Ok(reply)
}

async fn ignore_ssid(
    request: IgnoreRequest,
    state: SharedModel,
    controller: Arc<ScanCycleController>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    match controller.ignore_ssid(&request.ssid) {
        Ok(added) => {
            write(&state).dismiss(&request.ssid);
            Ok(warp::reply::with_status(
                warp::reply::json(&json!({"status": "ok", "added": added})),
                StatusCode::OK,
            ))
        }
        Err(err) => Ok(error_reply(&err)),
    }
}

async fn register_known(
    request: KnownRequest,
    state: SharedModel,
    controller: Arc<ScanCycleController>,
) -> Result<WithStatus<Json>, warp::Rejection> {
    if !is_hex_color(request.color.trim()) {
        return Ok(error_reply(&ScanError::Validation(format!(
            "color must be a hex code such as #33aa55, got {:?}",
            request.color
        ))));
    }
    match controller.register_known(&request.bssid, &request.ssid, &request.color) {
        Ok(entry) => {
            write(&state).tag(&entry);
            Ok(warp::reply::with_status(
                warp::reply::json(&json!({"status": "ok", "entry": entry})),
                StatusCode::OK,
            ))
        }
        Err(err) => Ok(error_reply(&err)),
    }
}

/// HTTP surface through which an external display reads results and submits user actions.
pub struct GuiBridge {
    state: SharedModel,
    controller: Arc<ScanCycleController>,
}

impl GuiBridge {
    pub fn new(controller: Arc<ScanCycleController>) -> Self {
        Self {
            state: Arc::new(RwLock::new(DisplayModel::default())),
            controller,
        }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        let state = self.state.clone();
        let state_filter = warp::any().map(move || state.clone());
        let controller = self.controller.clone();
        let controller_filter = warp::any().map(move || controller.clone());

        let get_route = warp::path("scan")
            .and(warp::path::end())
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: SharedModel| warp::reply::json(&*read(&state)));

        let scan_route = warp::path("scan")
            .and(warp::path::end())
            .and(warp::post())
            .and(state_filter.clone())
            .and(controller_filter.clone())
            .and_then(trigger_scan);

        let ignore_route = warp::path("ignore")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter.clone())
            .and(controller_filter.clone())
            .and_then(ignore_ssid);

        let known_route = warp::path("known")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter)
            .and(controller_filter)
            .and_then(register_known);

        get_route.or(scan_route).or(ignore_route).or(known_route)
    }

    /// Binds the HTTP endpoint on the current runtime and returns the bound address.
    pub fn serve(&self, addr: SocketAddr) -> anyhow::Result<SocketAddr> {
        let (bound, server) = warp::serve(self.routes())
            .try_bind_ephemeral(addr)
            .with_context(|| format!("binding display bridge on {}", addr))?;
        tokio::spawn(server);
        info!("display bridge listening on {}", bound);
        Ok(bound)
    }

    pub fn publish(&self, outcome: &ScanResult<CycleOutcome>) {
        let mut guard = write(&self.state);
        guard.apply(outcome);
        info!("[GUI] {}", guard.status);
    }

    pub fn snapshot(&self) -> DisplayModel {
        read(&self.state).clone()
    }
}
