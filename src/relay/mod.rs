// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Real-time annotation relay.
//!
//! Clients connect over a WebSocket ([`socket`]) and are registered with
//! the [`hub::Hub`]. Box edits are fanned out to every other client as they
//! arrive; the server neither validates nor stores them. Only an explicit
//! save through the HTTP API reaches the sidecar files.

pub mod hub;
pub mod protocol;
pub mod socket;

use crate::app::AppState;
use crate::io::media::is_safe_filename;
use crate::models::image::AnnotationSet;
use anyhow::{bail, Result};
use hub::ClientId;
use protocol::{ClientMessage, ServerEvent};

/// Handle one message from `client`.
pub async fn dispatch(state: &AppState, client: ClientId, message: ClientMessage) -> Result<()> {
    match message {
        ClientMessage::RequestAnnotations(filename) => {
            if !is_safe_filename(&filename) {
                bail!("Refusing annotations request for {:?}", filename);
            }
            let sidecars = state.sidecars.clone();
            let name = filename.clone();
            let annotations = tokio::task::spawn_blocking(move || sidecars.read(&name)).await?;
            log::debug!("Client {} loaded {} boxes for {}", client, annotations.len(), filename);
            state.hub.send_to(
                client,
                ServerEvent::Loaded(AnnotationSet {
                    filename,
                    annotations,
                }),
            );
        }
        ClientMessage::Create(payload) => relay(state, client, ServerEvent::Created(payload)),
        ClientMessage::Update(payload) => relay(state, client, ServerEvent::UpdatedRemote(payload)),
        ClientMessage::Delete(payload) => relay(state, client, ServerEvent::DeletedRemote(payload)),
    }
    Ok(())
}

fn relay(state: &AppState, client: ClientId, event: ServerEvent) {
    let name = event.name();
    let filename = event.filename().unwrap_or("?").to_string();
    let reached = state.hub.broadcast_except(client, event);
    log::debug!("Relayed {} on {} from {} to {} clients", name, filename, client, reached);
}
