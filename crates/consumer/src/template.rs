use std::collections::BTreeMap;

use seedbomb_core::DispatchRequest;
use serde::{Deserialize, Serialize};

use crate::error::ProcessingError;

/// Turns a message body into a [`DispatchRequest`].
///
/// The workflow coordinates are fixed; only the provisioning target varies
/// per message. The target is read from `target_field` when the body is a
/// JSON object, from the string itself when the body is a JSON string, and
/// from the trimmed raw body otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestTemplate {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Workflow id or file name.
    pub workflow_id: String,
    /// Branch or tag to run the workflow on.
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// Body field carrying the target when the body is a JSON object.
    pub target_field: String,
    /// Workflow input the target is passed as.
    pub input_name: String,
    /// Static inputs added to every dispatch.
    pub inputs: BTreeMap<String, String>,
}

impl Default for RequestTemplate {
    fn default() -> Self {
        Self {
            owner: "Maxwellcoyle-dev".to_owned(),
            repo: "ferrathorn_provisioning_test".to_owned(),
            workflow_id: "terraform.yml".to_owned(),
            ref_name: "main".to_owned(),
            target_field: "customer_name".to_owned(),
            input_name: "customer_name".to_owned(),
            inputs: BTreeMap::new(),
        }
    }
}

impl RequestTemplate {
    /// Create a template for the given workflow with default field names.
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        workflow_id: impl Into<String>,
        ref_name: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            workflow_id: workflow_id.into(),
            ref_name: ref_name.into(),
            ..Self::default()
        }
    }

    /// Add a static input.
    #[must_use]
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    /// Extract the provisioning target from a message body.
    pub fn extract_target(&self, body: &str) -> Result<String, ProcessingError> {
        let trimmed = body.trim();
        let target = match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(serde_json::Value::Object(map)) => match map.get(&self.target_field) {
                Some(serde_json::Value::String(s)) => s.trim().to_owned(),
                Some(_) => {
                    return Err(ProcessingError::InvalidMessage(format!(
                        "field '{}' is not a string",
                        self.target_field
                    )));
                }
                None => {
                    return Err(ProcessingError::InvalidMessage(format!(
                        "body has no '{}' field",
                        self.target_field
                    )));
                }
            },
            Ok(serde_json::Value::String(s)) => s.trim().to_owned(),
            _ => trimmed.to_owned(),
        };

        if target.is_empty() {
            return Err(ProcessingError::InvalidMessage(
                "message body names no target".to_owned(),
            ));
        }
        Ok(target)
    }

    /// Build the dispatch request for a message body.
    pub fn render(&self, body: &str) -> Result<DispatchRequest, ProcessingError> {
        let target = self.extract_target(body)?;
        let mut request = DispatchRequest::new(
            self.owner.as_str(),
            self.repo.as_str(),
            self.workflow_id.as_str(),
            self.ref_name.as_str(),
        );
        request.inputs.clone_from(&self.inputs);
        request.inputs.insert(self.input_name.clone(), target);
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_body_is_target() {
        let template = RequestTemplate::default();
        let request = template.render("  ferrathorn-customer-010\n").unwrap();
        assert_eq!(request.owner, "Maxwellcoyle-dev");
        assert_eq!(request.repo, "ferrathorn_provisioning_test");
        assert_eq!(request.workflow_id, "terraform.yml");
        assert_eq!(request.ref_name, "main");
        assert_eq!(request.inputs["customer_name"], "ferrathorn-customer-010");
    }

    #[test]
    fn json_object_field_is_target() {
        let template = RequestTemplate::default();
        let target = template
            .extract_target(r#"{"customer_name":"acme","plan":"pro"}"#)
            .unwrap();
        assert_eq!(target, "acme");
    }

    #[test]
    fn json_string_body_is_unquoted() {
        let template = RequestTemplate::default();
        assert_eq!(template.extract_target(r#""acme""#).unwrap(), "acme");
    }

    #[test]
    fn empty_body_is_invalid() {
        let template = RequestTemplate::default();
        assert!(matches!(
            template.render("   "),
            Err(ProcessingError::InvalidMessage(_))
        ));
        assert!(matches!(
            template.render(r#"{"customer_name":""}"#),
            Err(ProcessingError::InvalidMessage(_))
        ));
    }

    #[test]
    fn object_without_field_is_invalid() {
        let template = RequestTemplate::default();
        let err = template.render(r#"{"tenant":"acme"}"#).unwrap_err();
        assert!(err.to_string().contains("customer_name"));
    }

    #[test]
    fn non_string_field_is_invalid() {
        let template = RequestTemplate::default();
        assert!(template.render(r#"{"customer_name":42}"#).is_err());
    }

    #[test]
    fn static_inputs_and_custom_names() {
        let mut template =
            RequestTemplate::new("acme", "infra", "provision.yml", "release").with_input("env", "prod");
        template.target_field = "tenant".into();
        template.input_name = "tenant_id".into();

        let request = template.render(r#"{"tenant":"t-42"}"#).unwrap();
        assert_eq!(request.ref_name, "release");
        assert_eq!(request.inputs.len(), 2);
        assert_eq!(request.inputs["env"], "prod");
        assert_eq!(request.inputs["tenant_id"], "t-42");
    }

    #[test]
    fn target_overrides_static_input_of_same_name() {
        let template = RequestTemplate::default().with_input("customer_name", "static");
        let request = template.render("dynamic").unwrap();
        assert_eq!(request.inputs["customer_name"], "dynamic");
    }

    #[test]
    fn deserialize_uses_ref_key() {
        let template: RequestTemplate =
            serde_json::from_str(r#"{"owner":"o","repo":"r","ref":"develop"}"#).unwrap();
        assert_eq!(template.ref_name, "develop");
        assert_eq!(template.workflow_id, "terraform.yml");
    }
}
