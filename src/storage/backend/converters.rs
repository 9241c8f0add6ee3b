use std::str::FromStr;

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};

use crate::storage::models::{
    Attendance, Event, Majlis, Participant, ParticipantCategory, ParticipantDraft, Region,
    ReportFields, ReportKey, ReportRow, SubUser, UserRole,
};
use migration::entities::{
    event, event_attendance, majlis, other_report, participant, region, report_data, sub_user,
};

pub fn model_to_region(model: region::Model) -> Region {
    Region {
        id: model.id,
        name: model.name,
        code: model.code,
        created_at: model.created_at,
    }
}

pub fn model_to_majlis(model: majlis::Model) -> Majlis {
    Majlis {
        id: model.id,
        name: model.name,
        region_id: model.region_id,
        code: model.code,
        created_at: model.created_at,
    }
}

pub fn model_to_participant(model: participant::Model) -> Participant {
    Participant {
        id: model.id,
        name: model.name,
        father_name: model.father_name,
        date_of_birth: model.date_of_birth,
        joined_on: model.joined_on,
        // 历史数据中未知分类归为 other
        category: ParticipantCategory::from_str(&model.category).unwrap_or_default(),
        phone: model.phone,
        email: model.email,
        address: model.address,
        region_id: model.region_id,
        majlis_id: model.majlis_id,
        is_moosi: model.is_moosi,
        reads_quran: model.reads_quran,
        offers_salat: model.offers_salat,
        physically_fit: model.physically_fit,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// 参与者写入模型；`id` 为 None 时生成插入用模型
pub fn draft_to_active_model(
    draft: &ParticipantDraft,
    id: Option<i32>,
    now: DateTime<Utc>,
) -> participant::ActiveModel {
    participant::ActiveModel {
        id: id.map(Set).unwrap_or(NotSet),
        name: Set(draft.name.clone()),
        father_name: Set(draft.father_name.clone()),
        date_of_birth: Set(draft.date_of_birth),
        joined_on: Set(draft.joined_on),
        category: Set(draft.category.as_ref().to_string()),
        phone: Set(draft.phone.clone()),
        email: Set(draft.email.clone()),
        address: Set(draft.address.clone()),
        region_id: Set(draft.region_id),
        majlis_id: Set(draft.majlis_id),
        is_moosi: Set(draft.is_moosi),
        reads_quran: Set(draft.reads_quran),
        offers_salat: Set(draft.offers_salat),
        physically_fit: Set(draft.physically_fit),
        created_at: if id.is_none() { Set(now) } else { NotSet },
        updated_at: Set(now),
    }
}

pub fn model_to_event(model: event::Model) -> Event {
    Event {
        id: model.id,
        name: model.name,
        event_date: model.event_date,
        is_active: model.is_active,
        created_at: model.created_at,
    }
}

pub fn model_to_attendance(model: event_attendance::Model) -> Attendance {
    Attendance {
        id: model.id,
        event_id: model.event_id,
        participant_id: model.participant_id,
        present: model.present,
        marked_at: model.marked_at,
    }
}

pub fn model_to_report_row(model: report_data::Model) -> ReportRow {
    ReportRow {
        id: model.id,
        key: ReportKey {
            region_id: model.region_id,
            majlis_id: model.majlis_id,
            report_month: model.report_month,
            report_year: model.report_year,
            section_key: model.section_key,
        },
        fields: ReportFields {
            meetings_held: model.meetings_held,
            attendance: model.attendance,
            members_contacted: model.members_contacted,
            books_distributed: model.books_distributed,
            amount_collected: model.amount_collected,
            target_amount: model.target_amount,
            remarks: model.remarks,
        },
        updated_at: model.updated_at,
    }
}

pub fn report_to_active_model(
    key: &ReportKey,
    fields: &ReportFields,
    now: DateTime<Utc>,
) -> report_data::ActiveModel {
    report_data::ActiveModel {
        id: NotSet,
        region_id: Set(key.region_id),
        majlis_id: Set(key.majlis_id),
        report_month: Set(key.report_month),
        report_year: Set(key.report_year),
        section_key: Set(key.section_key.clone()),
        meetings_held: Set(fields.meetings_held),
        attendance: Set(fields.attendance),
        members_contacted: Set(fields.members_contacted),
        books_distributed: Set(fields.books_distributed),
        amount_collected: Set(fields.amount_collected),
        target_amount: Set(fields.target_amount),
        remarks: Set(fields.remarks.clone()),
        updated_at: Set(now),
    }
}

pub fn other_report_key(model: &other_report::Model) -> ReportKey {
    ReportKey {
        region_id: model.region_id,
        majlis_id: model.majlis_id,
        report_month: model.report_month,
        report_year: model.report_year,
        section_key: model.section_key.clone(),
    }
}

pub fn model_to_sub_user(model: sub_user::Model) -> SubUser {
    SubUser {
        id: model.id,
        name: model.name,
        role: UserRole::from_str(&model.role).unwrap_or_default(),
        username: model.username,
        password_hash: model.password_hash,
        created_at: model.created_at,
    }
}
