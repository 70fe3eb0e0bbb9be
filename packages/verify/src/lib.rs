#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Verification matching and scoring engine.
//!
//! Compares an incoming verification request against the police
//! registry, recent stolen reports, and the owner watchlist, producing a
//! three-state classification with a confidence score. Every invocation
//! appends one row to the audit log; that write is part of the contract,
//! a failed audit write fails the whole call.

pub mod text;

use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use platewatch_datastore::{Datastore, StoreError};
use platewatch_datastore_models::NewVerificationAttempt;
use platewatch_vehicle_models::FlagCategory;
use serde::{Deserialize, Serialize};

use crate::text::similarity_ratio;

/// Stolen reports older than this many days no longer raise the flag.
pub const STOLEN_RECENT_DAYS: i64 = 30;

const PLATE_WEIGHT: f64 = 0.6;
const MAKE_WEIGHT: f64 = 0.2;
const MODEL_WEIGHT: f64 = 0.2;
const OWNER_EXACT_BONUS: f64 = 10.0;
const OWNER_FUZZY_BONUS: f64 = 5.0;
const REGIONAL_PENALTY: f64 = 15.0;
const WEAK_FIELD_THRESHOLD: f64 = 70.0;

/// Errors that can occur while verifying a vehicle.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// Registry lookup or audit write failure.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// The request could not be encoded for the audit log.
    #[error("Failed to encode request payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// A verification request. Only `plate_number` is semantically required;
/// the engine treats a missing plate as its logged fast-path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Result of one verification call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationOutcome {
    /// Whether a registration matched the request plate.
    pub match_status: bool,
    /// Three-state classification.
    pub flag_category: FlagCategory,
    /// Confidence score, 0-100 with one decimal.
    pub confidence: f64,
    /// When the verification ran.
    pub verification_timestamp: DateTime<Utc>,
    /// Case numbers of matching open stolen reports, newest first.
    pub reference_case_numbers: Vec<String>,
    /// Wall-clock duration of the call.
    pub response_time_ms: u64,
    /// Only set on the missing-plate fast path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn round_confidence(confidence: f64) -> f64 {
    (confidence.min(100.0) * 10.0).round() / 10.0
}

/// Stub regional cross-check. Always passes today; a failing check costs
/// [`REGIONAL_PENALTY`] confidence points once a real rule exists.
fn regional_cross_check(region_code: Option<&str>, _plate_number: &str) -> (bool, String) {
    match region_code {
        None | Some("") => (true, "No region provided; default pass".to_string()),
        Some(code) => (true, format!("Region {code} accepted (stub)")),
    }
}

/// Runs the matching and scoring pipeline for one request and appends an
/// audit row.
///
/// # Errors
///
/// Returns [`VerifyError`] if a registry lookup fails, if the request
/// cannot be encoded for the audit log, or if the audit write itself
/// fails. The audit trail is never silently dropped.
pub fn verify_vehicle(
    store: &dyn Datastore,
    request: &VerificationRequest,
) -> Result<VerificationOutcome, VerifyError> {
    let started = Instant::now();
    let now = Utc::now();
    let input_payload = serde_json::to_value(request)?;

    let plate = request.plate_number.as_deref().unwrap_or("").trim();
    let make_in = request.make.as_deref();
    let model_in = request.model.as_deref();
    let owner_in = request.owner_name.as_deref();
    let region_in = request.region_code.as_deref();

    if plate.is_empty() {
        let message = "Missing plate_number".to_string();
        let response_time_ms = elapsed_ms(started);
        store.insert_verification_attempt(NewVerificationAttempt {
            input_payload,
            matched_registration_id: None,
            matched_stolen_report_id: None,
            matched_owner_watchlist_id: None,
            match_status: false,
            flag_category: FlagCategory::Normal,
            confidence: 0.0,
            verification_timestamp: now,
            response_time_ms,
            reference_case_numbers: vec![],
            message: message.clone(),
        })?;
        return Ok(VerificationOutcome {
            match_status: false,
            flag_category: FlagCategory::Normal,
            confidence: 0.0,
            verification_timestamp: now,
            reference_case_numbers: vec![],
            response_time_ms,
            message: Some(message),
        });
    }

    if let Some(reg) = store.registration_by_plate(plate)? {
        let mut confidence = 100.0 * PLATE_WEIGHT;

        let make_score = similarity_ratio(make_in.unwrap_or(""), &reg.make);
        let model_score = similarity_ratio(model_in.unwrap_or(""), &reg.model);
        let owner_fuzzy = similarity_ratio(owner_in.unwrap_or(""), &reg.owner_name);
        let owner_exact = match owner_in {
            Some(owner) if !owner.is_empty() && !reg.owner_name.is_empty() => {
                owner.trim().to_lowercase() == reg.owner_name.trim().to_lowercase()
            }
            _ => false,
        };

        confidence += make_score * MAKE_WEIGHT;
        confidence += model_score * MODEL_WEIGHT;
        if owner_exact {
            confidence = (confidence + OWNER_EXACT_BONUS).min(100.0);
        } else if owner_fuzzy >= 80.0 {
            confidence = (confidence + OWNER_FUZZY_BONUS).min(100.0);
        }

        let (regional_ok, regional_note) = regional_cross_check(region_in, plate);
        if !regional_ok {
            confidence = (confidence - REGIONAL_PENALTY).max(0.0);
        }

        let since = now - Duration::days(STOLEN_RECENT_DAYS);
        let stolen_reports = store.open_stolen_reports(plate, Some(reg.id), since)?;

        let watch_owner = if reg.owner_name.is_empty() {
            owner_in.filter(|owner| !owner.is_empty())
        } else {
            Some(reg.owner_name.as_str())
        };
        let watch_hit = match watch_owner {
            Some(owner) => store.active_watchlist_entry(owner)?,
            None => None,
        };

        let mut flag_category = FlagCategory::Normal;
        let mut reference_case_numbers: Vec<String> = vec![];
        if stolen_reports.is_empty() {
            if watch_hit.is_some() {
                flag_category = FlagCategory::Suspicious;
                confidence = confidence.max(75.0);
            } else if (make_score >= WEAK_FIELD_THRESHOLD
                || model_score >= WEAK_FIELD_THRESHOLD
                || owner_fuzzy >= WEAK_FIELD_THRESHOLD)
                && confidence < 80.0
            {
                // Plate matched but the supporting fields are shaky.
                flag_category = FlagCategory::Suspicious;
            }
        } else {
            flag_category = FlagCategory::Stolen;
            reference_case_numbers = stolen_reports
                .iter()
                .map(|report| report.case_number.clone())
                .collect();
            confidence = confidence.max(90.0);
        }

        let confidence = round_confidence(confidence);
        let attempt = store.insert_verification_attempt(NewVerificationAttempt {
            input_payload,
            matched_registration_id: Some(reg.id),
            matched_stolen_report_id: stolen_reports.first().map(|report| report.id),
            matched_owner_watchlist_id: watch_hit.map(|entry| entry.id),
            match_status: true,
            flag_category,
            confidence,
            verification_timestamp: now,
            response_time_ms: elapsed_ms(started),
            reference_case_numbers: reference_case_numbers.clone(),
            message: regional_note,
        })?;
        log::debug!("Verified plate {plate}: {flag_category} at {confidence:.1}");
        return Ok(VerificationOutcome {
            match_status: true,
            flag_category,
            confidence,
            verification_timestamp: now,
            reference_case_numbers,
            response_time_ms: attempt.response_time_ms,
            message: None,
        });
    }

    // No registration matched, classify from the watchlist alone.
    let watch_hit = match owner_in.filter(|owner| !owner.is_empty()) {
        Some(owner) => store.active_watchlist_entry(owner)?,
        None => None,
    };
    let (flag_category, confidence, message) = if watch_hit.is_some() {
        (FlagCategory::Suspicious, 60.0, "Owner on watchlist")
    } else {
        (FlagCategory::Normal, 20.0, "No registration match")
    };

    let response_time_ms = elapsed_ms(started);
    store.insert_verification_attempt(NewVerificationAttempt {
        input_payload,
        matched_registration_id: None,
        matched_stolen_report_id: None,
        matched_owner_watchlist_id: watch_hit.map(|entry| entry.id),
        match_status: false,
        flag_category,
        confidence,
        verification_timestamp: now,
        response_time_ms,
        reference_case_numbers: vec![],
        message: message.to_string(),
    })?;
    log::debug!("Verified plate {plate}: {flag_category} with no registration");

    Ok(VerificationOutcome {
        match_status: false,
        flag_category,
        confidence,
        verification_timestamp: now,
        reference_case_numbers: vec![],
        response_time_ms,
        message: None,
    })
}
