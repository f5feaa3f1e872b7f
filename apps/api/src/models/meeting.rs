//! Meeting records and the scheduling workflow.
//!
//! HR proposes one or more time slots, the applicant confirms one of them,
//! may later ask for a different date, and HR answers with a fresh set of
//! slots. Every move is checked against the current status in
//! [`MeetingStatus::apply`]; nothing else mutates `status`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::user::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    Proposed,
    Confirmed,
    RescheduleRequested,
    Rescheduled,
    Cancelled,
    Completed,
}

impl MeetingStatus {
    pub const ALL: [MeetingStatus; 6] = [
        MeetingStatus::Proposed,
        MeetingStatus::Confirmed,
        MeetingStatus::RescheduleRequested,
        MeetingStatus::Rescheduled,
        MeetingStatus::Cancelled,
        MeetingStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Proposed => "proposed",
            MeetingStatus::Confirmed => "confirmed",
            MeetingStatus::RescheduleRequested => "reschedule_requested",
            MeetingStatus::Rescheduled => "rescheduled",
            MeetingStatus::Cancelled => "cancelled",
            MeetingStatus::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MeetingStatus::Cancelled | MeetingStatus::Completed)
    }

    /// Returns the status reached by `action`, or an error when the action is
    /// not allowed from `self`.
    pub fn apply(self, action: MeetingAction) -> Result<MeetingStatus, SchedulingError> {
        use MeetingAction::*;
        use MeetingStatus::*;

        let next = match (self, action) {
            (Proposed | Rescheduled, SelectSlot) => Confirmed,
            (Confirmed, RequestReschedule) => RescheduleRequested,
            (RescheduleRequested, ProposeSlots) => Rescheduled,
            (Confirmed, Complete) => Completed,
            (from, Cancel) if !from.is_terminal() => Cancelled,
            (from, action) => return Err(SchedulingError::InvalidState { from, action }),
        };
        Ok(next)
    }
}

impl fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeetingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown meeting status '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingAction {
    SelectSlot,
    RequestReschedule,
    ProposeSlots,
    Cancel,
    Complete,
}

impl fmt::Display for MeetingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MeetingAction::SelectSlot => "select a slot",
            MeetingAction::RequestReschedule => "request a reschedule",
            MeetingAction::ProposeSlots => "propose new slots",
            MeetingAction::Cancel => "cancel",
            MeetingAction::Complete => "complete",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingMode {
    Online,
    Onsite,
    Phone,
}

impl MeetingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingMode::Online => "online",
            MeetingMode::Onsite => "onsite",
            MeetingMode::Phone => "phone",
        }
    }
}

impl FromStr for MeetingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(MeetingMode::Online),
            "onsite" => Ok(MeetingMode::Onsite),
            "phone" => Ok(MeetingMode::Phone),
            other => Err(format!("unknown meeting mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub selected: bool,
}

impl TimeSlot {
    pub fn new(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Result<Self, SchedulingError> {
        if ends_at <= starts_at {
            return Err(SchedulingError::InvalidSlot);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            starts_at,
            ends_at,
            selected: false,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulingError {
    #[error("cannot {action} while the meeting is {from}")]
    InvalidState {
        from: MeetingStatus,
        action: MeetingAction,
    },
    #[error("time slot not found")]
    SlotNotFound,
    #[error("a time slot must end after it starts")]
    InvalidSlot,
    #[error("at least one time slot is required")]
    NoSlots,
    #[error("a reason is required")]
    MissingReason,
}

#[derive(Debug, Clone)]
pub struct Meeting {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub hr_id: Uuid,
    pub created_by: Role,
    pub status: MeetingStatus,
    pub time_slots: Vec<TimeSlot>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub mode: MeetingMode,
    pub location: String,
    pub notes: String,
    pub reschedule_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything HR supplies when opening a meeting.
pub struct MeetingDraft {
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub hr_id: Uuid,
    pub created_by: Role,
    pub time_slots: Vec<TimeSlot>,
    pub mode: MeetingMode,
    pub location: String,
    pub notes: String,
}

impl Meeting {
    pub fn propose(draft: MeetingDraft) -> Result<Self, SchedulingError> {
        if draft.time_slots.is_empty() {
            return Err(SchedulingError::NoSlots);
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            job_id: draft.job_id,
            applicant_id: draft.applicant_id,
            hr_id: draft.hr_id,
            created_by: draft.created_by,
            status: MeetingStatus::Proposed,
            time_slots: draft.time_slots,
            starts_at: None,
            ends_at: None,
            mode: draft.mode,
            location: draft.location,
            notes: draft.notes,
            reschedule_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn transition(&mut self, action: MeetingAction) -> Result<(), SchedulingError> {
        self.status = self.status.apply(action)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn select_slot(&mut self, slot_id: Uuid) -> Result<&TimeSlot, SchedulingError> {
        let next = self.status.apply(MeetingAction::SelectSlot)?;
        let index = self
            .time_slots
            .iter()
            .position(|slot| slot.id == slot_id)
            .ok_or(SchedulingError::SlotNotFound)?;

        for (i, slot) in self.time_slots.iter_mut().enumerate() {
            slot.selected = i == index;
        }
        let chosen = &self.time_slots[index];
        self.starts_at = Some(chosen.starts_at);
        self.ends_at = Some(chosen.ends_at);
        self.status = next;
        self.updated_at = Utc::now();
        Ok(&self.time_slots[index])
    }

    pub fn request_reschedule(&mut self, reason: &str) -> Result<(), SchedulingError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(SchedulingError::MissingReason);
        }
        self.transition(MeetingAction::RequestReschedule)?;
        self.reschedule_reason = Some(reason.to_string());
        Ok(())
    }

    /// HR's answer to a reschedule request: the old slots and selection are
    /// dropped.
    pub fn propose_new_slots(&mut self, slots: Vec<TimeSlot>) -> Result<(), SchedulingError> {
        if slots.is_empty() {
            return Err(SchedulingError::NoSlots);
        }
        self.transition(MeetingAction::ProposeSlots)?;
        self.time_slots = slots;
        self.starts_at = None;
        self.ends_at = None;
        self.reschedule_reason = None;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), SchedulingError> {
        self.transition(MeetingAction::Cancel)
    }

    pub fn complete(&mut self) -> Result<(), SchedulingError> {
        self.transition(MeetingAction::Complete)
    }
}
