use async_graphql::{InputObject, SimpleObject};
use products_hr::{Employee, EmployeeField, FieldValues, SelectOption};

use crate::hr::Intake;

#[derive(Clone, Debug, SimpleObject)]
pub struct EmployeeNode {
    /// First and last name joined, skipping whichever is blank.
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub start_date: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub department: String,
}

impl From<Employee> for EmployeeNode {
    fn from(employee: Employee) -> Self {
        Self {
            full_name: employee.full_name(),
            first_name: employee.first_name,
            last_name: employee.last_name,
            date_of_birth: employee.date_of_birth,
            start_date: employee.start_date,
            street: employee.street,
            city: employee.city,
            state: employee.state,
            zip_code: employee.zip_code,
            department: employee.department,
        }
    }
}

pub fn nodes(employees: impl IntoIterator<Item = Employee>) -> Vec<EmployeeNode> {
    employees.into_iter().map(EmployeeNode::from).collect()
}

/// Form submission. Omitted fields are recorded as empty strings unless the
/// server runs in strict mode.
#[derive(Clone, Debug, Default, InputObject)]
pub struct EmployeeInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub start_date: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub department: Option<String>,
}

impl From<EmployeeInput> for FieldValues {
    fn from(input: EmployeeInput) -> Self {
        let pairs = [
            (EmployeeField::FirstName, input.first_name),
            (EmployeeField::LastName, input.last_name),
            (EmployeeField::DateOfBirth, input.date_of_birth),
            (EmployeeField::StartDate, input.start_date),
            (EmployeeField::Street, input.street),
            (EmployeeField::City, input.city),
            (EmployeeField::State, input.state),
            (EmployeeField::ZipCode, input.zip_code),
            (EmployeeField::Department, input.department),
        ];
        let mut values = FieldValues::new();
        for (field, value) in pairs {
            if let Some(value) = value {
                values.set(field, value);
            }
        }
        values
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct AddEmployeePayload {
    pub employee: EmployeeNode,
    pub confirmation: String,
    pub total: usize,
}

impl From<Intake> for AddEmployeePayload {
    fn from(intake: Intake) -> Self {
        Self {
            employee: intake.employee.into(),
            confirmation: intake.confirmation,
            total: intake.total,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct OptionNode {
    pub value: String,
    pub label: String,
}

impl From<SelectOption> for OptionNode {
    fn from(option: SelectOption) -> Self {
        Self {
            value: option.value,
            label: option.label,
        }
    }
}
