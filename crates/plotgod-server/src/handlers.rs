//! HTTP handlers, one per endpoint, organized by entity.
//!
//! Each handler follows the same shape: pull fields out of the payload, run
//! them through the validation layer, hand the cleaned values to the
//! matching repository, and map the outcome onto `{"ok": ...}` bodies.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use plotgod_core::ids::{CampaignId, LocationId, NpcId, PartyMemberId, SessionId};
use plotgod_core::validate;
use plotgod_llm::prompt;
use plotgod_store::campaigns::CampaignRepo;
use plotgod_store::locations::{LocationFields, LocationRepo};
use plotgod_store::npcs::{NpcFields, NpcRepo};
use plotgod_store::party::{PartyMemberFields, PartyMemberRepo};
use plotgod_store::sessions::SessionRepo;

use crate::errors::ApiError;
use crate::payload::{field_str, Payload};
use crate::server::AppState;

type ApiResult = Result<(StatusCode, Json<Value>), ApiError>;

fn respond(status: StatusCode, extra: Value) -> ApiResult {
    let mut body = serde_json::Map::new();
    body.insert("ok".into(), Value::Bool(true));
    if let Value::Object(map) = extra {
        body.extend(map);
    }
    Ok((status, Json(Value::Object(body))))
}

fn ok(extra: Value) -> ApiResult {
    respond(StatusCode::OK, extra)
}

fn ok_empty() -> ApiResult {
    respond(StatusCode::OK, json!({}))
}

fn created(extra: Value) -> ApiResult {
    respond(StatusCode::CREATED, extra)
}

// ── Campaigns ──

pub async fn campaigns_list(State(state): State<AppState>) -> ApiResult {
    let campaigns = CampaignRepo::new(state.db.clone()).list()?;
    ok(json!({"campaigns": campaigns}))
}

pub async fn campaigns_create(State(state): State<AppState>, Payload(data): Payload) -> ApiResult {
    let name = validate::name(field_str(&data, "name").as_deref(), "name", 100)?;
    let id = CampaignRepo::new(state.db.clone()).create(&name)?;
    created(json!({"id": id}))
}

pub async fn campaigns_get(
    State(state): State<AppState>,
    Path(campaign_id): Path<CampaignId>,
) -> ApiResult {
    match CampaignRepo::new(state.db.clone()).get(campaign_id)? {
        Some(campaign) => ok(json!({"campaign": campaign})),
        None => Err(ApiError::not_found("Campaign not found.")),
    }
}

pub async fn campaigns_update(
    State(state): State<AppState>,
    Path(campaign_id): Path<CampaignId>,
    Payload(data): Payload,
) -> ApiResult {
    let name = validate::name(field_str(&data, "name").as_deref(), "name", 100)?;
    if CampaignRepo::new(state.db.clone()).update(campaign_id, &name)? {
        ok_empty()
    } else {
        Err(ApiError::not_found("Campaign could not be updated."))
    }
}

pub async fn campaigns_delete(
    State(state): State<AppState>,
    Path(campaign_id): Path<CampaignId>,
) -> ApiResult {
    if CampaignRepo::new(state.db.clone()).delete(campaign_id)? {
        ok_empty()
    } else {
        Err(ApiError::not_found("Campaign could not be deleted."))
    }
}

pub async fn campaigns_last_session(
    State(state): State<AppState>,
    Path(campaign_id): Path<CampaignId>,
) -> ApiResult {
    let Some(data) = CampaignRepo::new(state.db.clone()).last_session(campaign_id)? else {
        return Err(ApiError::not_found("Campaign not found."));
    };
    // The landing page treats "no transcript yet" as empty text.
    ok(json!({
        "campaign": {"id": data.id, "name": data.name},
        "last_session_text": data.last_session_text.unwrap_or_default(),
    }))
}

pub async fn campaigns_session_prep(
    State(state): State<AppState>,
    Path(campaign_id): Path<CampaignId>,
) -> ApiResult {
    let Some(data) = CampaignRepo::new(state.db.clone()).last_session(campaign_id)? else {
        return Err(ApiError::not_found("Campaign not found."));
    };
    let Some(transcript) = data.last_session_text else {
        return Err(ApiError::not_found("No stored session found for this campaign."));
    };

    let user_prompt = prompt::build_user_prompt(&data.name, &transcript);
    // Generation failures are shown inline instead of failing the request.
    let prep = match state
        .generator
        .generate(prompt::SYSTEM_PROMPT, &user_prompt)
        .await
    {
        Ok(text) => text,
        Err(e) => format!("Error calling OpenAI: {e}"),
    };

    ok(json!({"campaign_name": data.name, "prep": prep}))
}

// ── Sessions ──

pub async fn sessions_list(
    State(state): State<AppState>,
    Path(campaign_id): Path<CampaignId>,
) -> ApiResult {
    let sessions = SessionRepo::new(state.db.clone()).list(campaign_id)?;
    ok(json!({"sessions": sessions}))
}

pub async fn sessions_create(
    State(state): State<AppState>,
    Path(campaign_id): Path<CampaignId>,
    Payload(data): Payload,
) -> ApiResult {
    let content = validate::long_text(field_str(&data, "content").as_deref(), "content", 50_000)?;
    let id = SessionRepo::new(state.db.clone()).create(campaign_id, &content)?;
    created(json!({"id": id}))
}

pub async fn sessions_get(
    State(state): State<AppState>,
    Path((campaign_id, session_id)): Path<(CampaignId, SessionId)>,
) -> ApiResult {
    match SessionRepo::new(state.db.clone()).get(campaign_id, session_id)? {
        Some(session) => ok(json!({"session": session})),
        None => Err(ApiError::not_found("Session not found.")),
    }
}

pub async fn sessions_update(
    State(state): State<AppState>,
    Path((campaign_id, session_id)): Path<(CampaignId, SessionId)>,
    Payload(data): Payload,
) -> ApiResult {
    let content = validate::long_text(field_str(&data, "content").as_deref(), "content", 50_000)?;
    if SessionRepo::new(state.db.clone()).update(campaign_id, session_id, &content)? {
        ok_empty()
    } else {
        Err(ApiError::not_found("Session could not be updated."))
    }
}

pub async fn sessions_delete(
    State(state): State<AppState>,
    Path((campaign_id, session_id)): Path<(CampaignId, SessionId)>,
) -> ApiResult {
    if SessionRepo::new(state.db.clone()).delete(campaign_id, session_id)? {
        ok_empty()
    } else {
        Err(ApiError::not_found("Session could not be deleted."))
    }
}

// ── Party members ──

fn party_fields(data: &Value) -> Result<PartyMemberFields, ApiError> {
    Ok(PartyMemberFields {
        name: validate::name(field_str(data, "name").as_deref(), "name", 100)?,
        player_name: validate::name_opt(
            field_str(data, "player_name").as_deref(),
            "player_name",
            100,
        )?,
        character_species: validate::name_opt(
            field_str(data, "character_species").as_deref(),
            "character_species",
            100,
        )?,
        character_class: validate::name_opt(
            field_str(data, "character_class").as_deref(),
            "character_class",
            100,
        )?,
        level: validate::integer_opt(
            field_str(data, "level").as_deref(),
            "level",
            Some(0),
            Some(30),
        )?,
        notes: validate::long_text_opt(field_str(data, "notes").as_deref(), "notes", 4_000)?,
    })
}

pub async fn party_list(
    State(state): State<AppState>,
    Path(campaign_id): Path<CampaignId>,
) -> ApiResult {
    let members = PartyMemberRepo::new(state.db.clone()).list(campaign_id)?;
    ok(json!({"party_members": members}))
}

pub async fn party_create(
    State(state): State<AppState>,
    Path(campaign_id): Path<CampaignId>,
    Payload(data): Payload,
) -> ApiResult {
    let fields = party_fields(&data)?;
    let id = PartyMemberRepo::new(state.db.clone()).create(campaign_id, &fields)?;
    created(json!({"id": id}))
}

pub async fn party_get(
    State(state): State<AppState>,
    Path((campaign_id, member_id)): Path<(CampaignId, PartyMemberId)>,
) -> ApiResult {
    match PartyMemberRepo::new(state.db.clone()).get(campaign_id, member_id)? {
        Some(member) => ok(json!({"party_member": member})),
        None => Err(ApiError::not_found("Party member not found.")),
    }
}

pub async fn party_update(
    State(state): State<AppState>,
    Path((campaign_id, member_id)): Path<(CampaignId, PartyMemberId)>,
    Payload(data): Payload,
) -> ApiResult {
    let fields = party_fields(&data)?;
    if PartyMemberRepo::new(state.db.clone()).update(campaign_id, member_id, &fields)? {
        ok_empty()
    } else {
        Err(ApiError::not_found("Party member could not be updated."))
    }
}

pub async fn party_delete(
    State(state): State<AppState>,
    Path((campaign_id, member_id)): Path<(CampaignId, PartyMemberId)>,
) -> ApiResult {
    if PartyMemberRepo::new(state.db.clone()).delete(campaign_id, member_id)? {
        ok_empty()
    } else {
        Err(ApiError::not_found("Party member could not be deleted."))
    }
}

// ── NPCs ──

fn npc_fields(data: &Value) -> Result<NpcFields, ApiError> {
    Ok(NpcFields {
        name: validate::name(field_str(data, "name").as_deref(), "name", 100)?,
        species: validate::name_opt(field_str(data, "species").as_deref(), "species", 100)?,
        gender: validate::name_opt(field_str(data, "gender").as_deref(), "gender", 50)?,
        notes: validate::long_text_opt(field_str(data, "notes").as_deref(), "notes", 4_000)?,
    })
}

pub async fn npcs_list(
    State(state): State<AppState>,
    Path(campaign_id): Path<CampaignId>,
) -> ApiResult {
    let npcs = NpcRepo::new(state.db.clone()).list(campaign_id)?;
    ok(json!({"npcs": npcs}))
}

pub async fn npcs_create(
    State(state): State<AppState>,
    Path(campaign_id): Path<CampaignId>,
    Payload(data): Payload,
) -> ApiResult {
    let fields = npc_fields(&data)?;
    let id = NpcRepo::new(state.db.clone()).create(campaign_id, &fields)?;
    created(json!({"id": id}))
}

pub async fn npcs_get(
    State(state): State<AppState>,
    Path((campaign_id, npc_id)): Path<(CampaignId, NpcId)>,
) -> ApiResult {
    match NpcRepo::new(state.db.clone()).get(campaign_id, npc_id)? {
        Some(npc) => ok(json!({"npc": npc})),
        None => Err(ApiError::not_found("NPC not found.")),
    }
}

pub async fn npcs_update(
    State(state): State<AppState>,
    Path((campaign_id, npc_id)): Path<(CampaignId, NpcId)>,
    Payload(data): Payload,
) -> ApiResult {
    let fields = npc_fields(&data)?;
    if NpcRepo::new(state.db.clone()).update(campaign_id, npc_id, &fields)? {
        ok_empty()
    } else {
        Err(ApiError::not_found("NPC could not be updated."))
    }
}

pub async fn npcs_delete(
    State(state): State<AppState>,
    Path((campaign_id, npc_id)): Path<(CampaignId, NpcId)>,
) -> ApiResult {
    if NpcRepo::new(state.db.clone()).delete(campaign_id, npc_id)? {
        ok_empty()
    } else {
        Err(ApiError::not_found("NPC could not be deleted."))
    }
}

// ── Locations (global) ──

fn location_fields(data: &Value) -> Result<LocationFields, ApiError> {
    Ok(LocationFields {
        name: validate::name(field_str(data, "name").as_deref(), "name", 150)?,
        location_type: validate::name_opt(
            field_str(data, "location_type").as_deref(),
            "location_type",
            50,
        )?,
        notes: validate::long_text_opt(field_str(data, "notes").as_deref(), "notes", 8_000)?,
    })
}

pub async fn locations_list(State(state): State<AppState>) -> ApiResult {
    let locations = LocationRepo::new(state.db.clone()).list()?;
    ok(json!({"locations": locations}))
}

pub async fn locations_create(State(state): State<AppState>, Payload(data): Payload) -> ApiResult {
    let fields = location_fields(&data)?;
    let id = LocationRepo::new(state.db.clone()).create(&fields)?;
    created(json!({"id": id}))
}

pub async fn locations_get(
    State(state): State<AppState>,
    Path(location_id): Path<LocationId>,
) -> ApiResult {
    match LocationRepo::new(state.db.clone()).get(location_id)? {
        Some(location) => ok(json!({"location": location})),
        None => Err(ApiError::not_found("Location not found.")),
    }
}

pub async fn locations_update(
    State(state): State<AppState>,
    Path(location_id): Path<LocationId>,
    Payload(data): Payload,
) -> ApiResult {
    let fields = location_fields(&data)?;
    if LocationRepo::new(state.db.clone()).update(location_id, &fields)? {
        ok_empty()
    } else {
        Err(ApiError::not_found("Location could not be updated."))
    }
}

pub async fn locations_delete(
    State(state): State<AppState>,
    Path(location_id): Path<LocationId>,
) -> ApiResult {
    if LocationRepo::new(state.db.clone()).delete(location_id)? {
        ok_empty()
    } else {
        Err(ApiError::not_found("Location could not be deleted."))
    }
}
