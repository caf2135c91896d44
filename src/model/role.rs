#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Supervisor = 2,
    TeamLead = 3,
    Client = 4,
    Worker = 5,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Supervisor),
            3 => Some(Role::TeamLead),
            4 => Some(Role::Client),
            5 => Some(Role::Worker),
            _ => None,
        }
    }
}

/// Attendance operations gated by role.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AttendanceOp {
    CheckIn,
    CheckOut,
    Scan,
    Report,
    Upsert,
    Validate,
    Transmit,
}

const ALL_ROLES: &[Role] = &[
    Role::Admin,
    Role::Supervisor,
    Role::TeamLead,
    Role::Client,
    Role::Worker,
];

/// Policy table: which roles may invoke which operation.
pub fn allowed_roles(op: AttendanceOp) -> &'static [Role] {
    match op {
        AttendanceOp::CheckIn | AttendanceOp::CheckOut => ALL_ROLES,
        AttendanceOp::Scan => &[Role::TeamLead],
        AttendanceOp::Report => &[Role::Admin, Role::Supervisor, Role::TeamLead],
        AttendanceOp::Upsert => &[Role::Admin, Role::TeamLead],
        AttendanceOp::Validate => &[Role::TeamLead],
        AttendanceOp::Transmit => &[Role::TeamLead],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ids_round_trip() {
        for id in 1..=5u8 {
            let role = Role::from_id(id).unwrap();
            assert_eq!(role as u8, id);
        }
        assert!(Role::from_id(0).is_none());
        assert!(Role::from_id(6).is_none());
    }

    #[test]
    fn scan_validate_transmit_are_team_lead_only() {
        for op in [
            AttendanceOp::Scan,
            AttendanceOp::Validate,
            AttendanceOp::Transmit,
        ] {
            assert_eq!(allowed_roles(op), &[Role::TeamLead]);
        }
    }

    #[test]
    fn check_in_is_open_to_all_roles() {
        assert_eq!(allowed_roles(AttendanceOp::CheckIn).len(), 5);
        assert_eq!(allowed_roles(AttendanceOp::CheckOut).len(), 5);
    }

    #[test]
    fn report_excludes_workers_and_clients() {
        let roles = allowed_roles(AttendanceOp::Report);
        assert!(roles.contains(&Role::Admin));
        assert!(roles.contains(&Role::Supervisor));
        assert!(roles.contains(&Role::TeamLead));
        assert!(!roles.contains(&Role::Worker));
        assert!(!roles.contains(&Role::Client));
    }

    #[test]
    fn upsert_allows_admin_and_team_lead_only() {
        assert_eq!(
            allowed_roles(AttendanceOp::Upsert),
            &[Role::Admin, Role::TeamLead]
        );
    }
}
