//! Claim request validation
//!
//! Extracts the two required inputs from the operation's Parameters
//! resource. Validation is fail-fast per required parameter: the
//! first rule a parameter breaks produces the rejection message.

use fhir_model::{Identifier, Parameter, ParameterValue, Parameters, Reference};

pub(crate) const REQUISITION_PARAMETER: &str = "requisition";
pub(crate) const ORGANIZATION_PARAMETER: &str = "organization";

/// The validated input of one claim operation call
///
/// Immutable once constructed; built fresh for every call.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimRequest {
    /// Identifier grouping the requisition's tasks
    pub requisition: Identifier,
    /// The claimant organization, by literal reference or identifier
    pub organization: Reference,
}

impl ClaimRequest {
    /// Validates a Parameters resource into a claim request
    ///
    /// On failure the messages are ready to surface as an
    /// OperationOutcome.
    pub fn from_parameters(parameters: &Parameters) -> Result<Self, Vec<String>> {
        if parameters.parameter.is_empty() {
            return Err(vec![
                "No parameters were provided in the Parameters resource".to_string(),
            ]);
        }

        let requisition = match single_named(parameters, REQUISITION_PARAMETER)? {
            Parameter {
                value: Some(ParameterValue::Identifier(identifier)),
                ..
            } => identifier.clone(),
            _ => {
                return Err(vec![format!(
                    "The {REQUISITION_PARAMETER} parameter must carry an Identifier value"
                )])
            }
        };

        if !requisition.is_complete() {
            return Err(vec![format!(
                "The {REQUISITION_PARAMETER} parameter must provide an Identifier.system and an \
                 Identifier.value; one, or both, were not found"
            )]);
        }

        let organization = match single_named(parameters, ORGANIZATION_PARAMETER)? {
            Parameter {
                value: Some(ParameterValue::Reference(reference)),
                ..
            } => reference.clone(),
            _ => {
                return Err(vec![format!(
                    "The {ORGANIZATION_PARAMETER} parameter must carry a Reference value"
                )])
            }
        };

        let identifier_complete = organization
            .identifier
            .as_ref()
            .map(Identifier::is_complete)
            .unwrap_or(false);
        if !organization.has_literal() && !identifier_complete {
            return Err(vec![format!(
                "The {ORGANIZATION_PARAMETER} parameter must provide a Reference which contains \
                 either a Reference.reference or an Identifier with both a system and value"
            )]);
        }

        Ok(Self {
            requisition,
            organization,
        })
    }
}

/// Exactly one parameter with the given name, case-insensitively
fn single_named<'a>(parameters: &'a Parameters, name: &str) -> Result<&'a Parameter, Vec<String>> {
    let mut matches = parameters.named(name);
    let first = matches
        .next()
        .ok_or_else(|| vec![format!("Must provide one, and only one, {name} parameter")])?;
    if matches.next().is_some() {
        return Err(vec![format!(
            "Must provide one, and only one, {name} parameter; found more than one"
        )]);
    }
    Ok(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhir_model::Coding;

    fn valid_parameters() -> Parameters {
        Parameters {
            parameter: vec![
                Parameter::new(
                    "requisition",
                    ParameterValue::Identifier(Identifier::new("urn:req", "R1")),
                ),
                Parameter::new(
                    "organization",
                    ParameterValue::Reference(Reference::literal("Organization/42", "Acme")),
                ),
            ],
        }
    }

    #[test]
    fn accepts_a_complete_request() {
        let request = ClaimRequest::from_parameters(&valid_parameters()).unwrap();
        assert_eq!(request.requisition, Identifier::new("urn:req", "R1"));
        assert_eq!(request.organization.reference.as_deref(), Some("Organization/42"));
    }

    #[test]
    fn accepts_organization_by_identifier() {
        let mut parameters = valid_parameters();
        parameters.parameter[1] = Parameter::new(
            "organization",
            ParameterValue::Reference(Reference {
                identifier: Some(Identifier::new("urn:org", "ACME")),
                ..Default::default()
            }),
        );
        assert!(ClaimRequest::from_parameters(&parameters).is_ok());
    }

    #[test]
    fn rejects_empty_parameter_list() {
        let errors = ClaimRequest::from_parameters(&Parameters::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("No parameters were provided"));
    }

    #[test]
    fn rejects_missing_requisition() {
        let mut parameters = valid_parameters();
        parameters.parameter.remove(0);
        let errors = ClaimRequest::from_parameters(&parameters).unwrap_err();
        assert!(errors[0].contains("one, and only one, requisition"));
    }

    #[test]
    fn rejects_duplicate_requisition() {
        let mut parameters = valid_parameters();
        parameters.parameter.push(Parameter::new(
            "Requisition",
            ParameterValue::Identifier(Identifier::new("urn:req", "R2")),
        ));
        let errors = ClaimRequest::from_parameters(&parameters).unwrap_err();
        assert!(errors[0].contains("found more than one"));
    }

    #[test]
    fn rejects_wrongly_typed_requisition() {
        let mut parameters = valid_parameters();
        parameters.parameter[0] = Parameter::new(
            "requisition",
            ParameterValue::Coding(Coding::new("urn:req", "R1")),
        );
        let errors = ClaimRequest::from_parameters(&parameters).unwrap_err();
        assert!(errors[0].contains("must carry an Identifier"));
    }

    #[test]
    fn rejects_incomplete_requisition_identifier() {
        let mut parameters = valid_parameters();
        parameters.parameter[0] = Parameter::new(
            "requisition",
            ParameterValue::Identifier(Identifier {
                system: Some("urn:req".into()),
                value: None,
            }),
        );
        let errors = ClaimRequest::from_parameters(&parameters).unwrap_err();
        assert!(errors[0].contains("Identifier.system and an Identifier.value"));
    }

    #[test]
    fn rejects_missing_organization() {
        let mut parameters = valid_parameters();
        parameters.parameter.remove(1);
        let errors = ClaimRequest::from_parameters(&parameters).unwrap_err();
        assert!(errors[0].contains("one, and only one, organization"));
    }

    #[test]
    fn rejects_empty_organization_reference() {
        let mut parameters = valid_parameters();
        parameters.parameter[1] = Parameter::new(
            "organization",
            ParameterValue::Reference(Reference {
                identifier: Some(Identifier {
                    system: Some("urn:org".into()),
                    value: None,
                }),
                ..Default::default()
            }),
        );
        let errors = ClaimRequest::from_parameters(&parameters).unwrap_err();
        assert!(errors[0].contains("either a Reference.reference or an Identifier"));
    }

    #[test]
    fn validation_stops_at_the_first_failing_parameter() {
        // Both parameters are bad; only the requisition failure surfaces.
        let parameters = Parameters {
            parameter: vec![Parameter::new(
                "requisition",
                ParameterValue::String("not an identifier".into()),
            )],
        };
        let errors = ClaimRequest::from_parameters(&parameters).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("requisition"));
    }
}
