use crate::types::BatchRequest;
use crate::{MailchimpError, Result};

pub(crate) const ALLOWED_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Structural check on a submission before it touches the network. The
/// service runs one batch per account at a time, so a malformed request must
/// never spend that slot.
pub fn validate_request(request: &BatchRequest) -> Result<()> {
    if request.operations.is_empty() {
        return Err(MailchimpError::InvalidRequest(
            "the batch must have at least one operation".to_string(),
        ));
    }

    for (index, op) in request.operations.iter().enumerate() {
        if op.method.is_empty() {
            return Err(MailchimpError::InvalidRequest(format!(
                "operation {index} is missing a method"
            )));
        }
        if !ALLOWED_METHODS.contains(&op.method.as_str()) {
            return Err(MailchimpError::InvalidRequest(format!(
                "operation {index} has method {:?}, expected one of GET, POST, PUT, PATCH or DELETE",
                op.method
            )));
        }
        if op.path.is_empty() {
            return Err(MailchimpError::InvalidRequest(format!(
                "operation {index} is missing a path"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Operation;

    #[test]
    fn rejects_empty_operations() {
        let err = validate_request(&BatchRequest { operations: vec![] }).unwrap_err();
        assert!(matches!(err, MailchimpError::InvalidRequest(_)));
        assert!(err.to_string().contains("at least one operation"));
    }

    #[test]
    fn rejects_unknown_method() {
        let request = BatchRequest {
            operations: vec![Operation::get("/lists"), Operation::new("FETCH", "/lists")],
        };
        let err = validate_request(&request).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("operation 1"), "{message}");
        assert!(message.contains("FETCH"), "{message}");
    }

    #[test]
    fn rejects_missing_method_and_path() {
        let missing_method = BatchRequest {
            operations: vec![Operation::new("", "/lists")],
        };
        assert!(
            validate_request(&missing_method)
                .unwrap_err()
                .to_string()
                .contains("missing a method")
        );

        let missing_path = BatchRequest {
            operations: vec![Operation::new("DELETE", "")],
        };
        assert!(
            validate_request(&missing_path)
                .unwrap_err()
                .to_string()
                .contains("missing a path")
        );
    }

    #[test]
    fn accepts_all_allowed_methods() {
        let operations = ALLOWED_METHODS
            .iter()
            .map(|method| Operation::new(*method, "/lists"))
            .collect();
        assert!(validate_request(&BatchRequest { operations }).is_ok());
    }
}
