/// Cinema Model — Staff
///
/// Contracts, employees, roles and the supervision hierarchy.

use chrono::NaiveDate;
use tracing::debug;

use crate::associations::{EmployeeContract, RoleOwnership, ShiftCleaner, Supervision};
use crate::domain::{Contract, ContractTerms, Employee, Person, Role, RoleKind, RoleType};
use crate::error::{ModelError, Result, ValidationError};
use crate::extent::Id;
use crate::graph;
use crate::link::{self, Change};
use crate::state::{label, Cinema};
use crate::validate;

/// Input for [`Cinema::hire_employee`].
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub person: Person,
    pub hiring_date: NaiveDate,
    pub phone_number: String,
    pub contract: Option<Id<Contract>>,
}

/// Input for [`Cinema::assign_role`]. Passwords arrive in plain text and
/// are hashed before storage.
#[derive(Debug, Clone)]
pub enum NewRole {
    Cashier {
        pos_login: String,
        pos_password: String,
    },
    Technician {
        degree: String,
        on_call: bool,
    },
    Cleaner {
        has_safety_training: bool,
        last_safety_training: NaiveDate,
    },
}

impl NewRole {
    pub fn role_type(&self) -> RoleType {
        match self {
            Self::Cashier { .. } => RoleType::Cashier,
            Self::Technician { .. } => RoleType::Technician,
            Self::Cleaner { .. } => RoleType::Cleaner,
        }
    }

    fn into_kind(self, today: NaiveDate) -> std::result::Result<RoleKind, ValidationError> {
        Ok(match self {
            Self::Cashier {
                pos_login,
                pos_password,
            } => {
                validate::validate_pos_login(&pos_login)?;
                validate::validate_pos_password(&pos_password)?;
                RoleKind::Cashier {
                    pos_login,
                    pos_password_hash: validate::hash_secret(&pos_password),
                }
            }
            Self::Technician { degree, on_call } => {
                validate::validate_degree(&degree)?;
                RoleKind::Technician {
                    degree: degree.trim().to_string(),
                    on_call,
                }
            }
            Self::Cleaner {
                has_safety_training,
                last_safety_training,
            } => {
                validate::not_in_future_date("last_safety_training", last_safety_training, today)?;
                RoleKind::Cleaner {
                    has_safety_training,
                    last_safety_training,
                }
            }
        })
    }
}

impl Cinema {
    // ── Contracts ──────────────────────────────────────────────────

    pub fn add_contract(&mut self, terms: ContractTerms) -> Result<Id<Contract>> {
        validate::validate_contract(&terms)?;
        Ok(self.insert(Contract {
            terms,
            employee: None,
        }))
    }

    pub fn update_contract_terms(&mut self, contract: Id<Contract>, terms: ContractTerms) -> Result<()> {
        self.entity(contract)?;
        validate::validate_contract(&terms)?;
        if let Some(c) = self.entity_mut(contract) {
            c.terms = terms;
        }
        Ok(())
    }

    /// Bind, replace or (with `None`) drop an employee's contract.
    pub fn change_contract(&mut self, employee: Id<Employee>, contract: Option<Id<Contract>>) -> Result<Change> {
        link::set::<EmployeeContract, _>(self, employee, contract)
    }

    // ── Employees ──────────────────────────────────────────────────

    pub fn hire_employee(&mut self, new: NewEmployee) -> Result<Id<Employee>> {
        let today = self.today();
        validate::validate_person(&new.person, today, self.limits.max_age_years)?;
        validate::not_in_future_date("hiring_date", new.hiring_date, today)?;
        validate::validate_phone(&new.phone_number)?;
        if let Some(contract) = new.contract {
            link::admit::<EmployeeContract>(self, contract)?;
        }

        let id = self.insert(Employee {
            person: new.person,
            hiring_date: new.hiring_date,
            phone_number: new.phone_number,
            contract: new.contract,
            supervisor: None,
            subordinates: Vec::new(),
            roles: Vec::new(),
            served_orders: Vec::new(),
        });
        link::connect::<EmployeeContract>(self, id);
        Ok(id)
    }

    pub fn update_phone(&mut self, employee: Id<Employee>, phone_number: String) -> Result<()> {
        self.entity(employee)?;
        validate::validate_phone(&phone_number)?;
        if let Some(e) = self.entity_mut(employee) {
            e.phone_number = phone_number;
        }
        Ok(())
    }

    // ── Roles ──────────────────────────────────────────────────────

    /// Give `employee` a new role. An employee holds at most one role of
    /// each type.
    pub fn assign_role(&mut self, employee: Id<Employee>, new: NewRole) -> Result<Id<Role>> {
        let role_type = new.role_type();
        self.entity(employee)?;
        if self.role_of(employee, role_type).is_some() {
            return Err(ModelError::DuplicateRole {
                employee: label(employee),
                role: role_type.name(),
            });
        }
        let kind = new.into_kind(self.today())?;

        let id = self.insert(Role {
            kind,
            employee: Some(employee),
            sessions: Vec::new(),
            shifts: Vec::new(),
        });
        link::connect::<RoleOwnership>(self, id);
        debug!(employee = %employee, role = role_type.name(), "role assigned");
        Ok(id)
    }

    /// The employee's role of the given type, if any.
    pub fn role_of(&self, employee: Id<Employee>, role_type: RoleType) -> Option<Id<Role>> {
        link::holders::<RoleOwnership>(self, employee)
            .into_iter()
            .find(|role| self.find(*role).is_some_and(|r| r.role_type() == role_type))
    }

    pub fn has_role(&self, employee: Id<Employee>, role_type: RoleType) -> bool {
        self.role_of(employee, role_type).is_some()
    }

    pub(crate) fn require_role(&self, employee: Id<Employee>, role_type: RoleType) -> Result<Id<Role>> {
        self.entity(employee)?;
        self.role_of(employee, role_type).ok_or_else(|| ModelError::MissingRole {
            employee: label(employee),
            role: role_type.name(),
        })
    }

    /// `role` must be live and of `expected` type.
    pub(crate) fn role_of_kind(&self, role: Id<Role>, expected: RoleType) -> Result<&Role> {
        let r = self.entity(role)?;
        if r.role_type() != expected {
            return Err(ModelError::WrongRoleKind {
                role: label(role),
                expected: expected.name(),
            });
        }
        Ok(r)
    }

    pub fn set_on_call(&mut self, role: Id<Role>, value: bool) -> Result<()> {
        self.role_of_kind(role, RoleType::Technician)?;
        if let Some(RoleKind::Technician { on_call, .. }) = self.entity_mut(role).map(|r| &mut r.kind) {
            *on_call = value;
        }
        Ok(())
    }

    pub fn record_safety_training(&mut self, role: Id<Role>, on: NaiveDate) -> Result<()> {
        self.role_of_kind(role, RoleType::Cleaner)?;
        validate::not_in_future_date("last_safety_training", on, self.today())?;
        if let Some(RoleKind::Cleaner {
            has_safety_training,
            last_safety_training,
        }) = self.entity_mut(role).map(|r| &mut r.kind)
        {
            *has_safety_training = true;
            *last_safety_training = on;
        }
        Ok(())
    }

    /// Mean length of a cleaner's shifts in minutes; `None` without shifts.
    pub fn average_shift_minutes(&self, cleaner: Id<Role>) -> Result<Option<i64>> {
        self.role_of_kind(cleaner, RoleType::Cleaner)?;
        let minutes: Vec<i64> = link::holders::<ShiftCleaner>(self, cleaner)
            .into_iter()
            .filter_map(|shift| self.find(shift))
            .map(|shift| shift.duration().num_minutes())
            .collect();
        if minutes.is_empty() {
            return Ok(None);
        }
        Ok(Some(minutes.iter().sum::<i64>() / minutes.len() as i64))
    }

    // ── Supervision ────────────────────────────────────────────────

    pub fn assign_supervisor(&mut self, employee: Id<Employee>, supervisor: Id<Employee>) -> Result<Change> {
        graph::set_parent::<Supervision, _>(self, employee, Some(supervisor))
    }

    /// Clear the supervisor of `employee`. Fails if there is none.
    pub fn remove_supervisor(&mut self, employee: Id<Employee>) -> Result<()> {
        let Some(current) = self.entity(employee)?.supervisor else {
            return Err(ModelError::NotLinked {
                association: "supervision",
                holder: label(employee),
                target: "a supervisor".into(),
            });
        };
        self.remove_subordinate(current, employee)
    }

    pub fn add_subordinate(&mut self, supervisor: Id<Employee>, employee: Id<Employee>) -> Result<Change> {
        self.assign_supervisor(employee, supervisor)
    }

    pub fn remove_subordinate(&mut self, supervisor: Id<Employee>, employee: Id<Employee>) -> Result<()> {
        self.entity(supervisor)?;
        if self.entity(employee)?.supervisor != Some(supervisor) {
            return Err(ModelError::NotLinked {
                association: "supervision",
                holder: label(employee),
                target: label(supervisor),
            });
        }
        graph::set_parent::<Supervision, _>(self, employee, None)?;
        Ok(())
    }

    pub fn subordinates(&self, supervisor: Id<Employee>) -> Vec<Id<Employee>> {
        link::holders::<Supervision>(self, supervisor)
    }

    /// Supervisors above `employee`, nearest first.
    pub fn chain_of_command(&self, employee: Id<Employee>) -> Vec<Id<Employee>> {
        graph::ancestors::<Supervision, _>(self, employee)
    }
}
