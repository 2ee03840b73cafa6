// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0
//! SAML2 back-channel logout message.
use chrono::{DateTime, SecondsFormat, Utc};

use crate::logout::LogoutRequest;

/// Build the SAML2 `LogoutRequest` for the service.
///
/// The session index is the id of the ticket issued to the service, the name
/// id is not used by the CAS clients.
pub fn build_logout_message(request: &LogoutRequest, issue_instant: DateTime<Utc>) -> String {
    format!(
        concat!(
            r#"<samlp:LogoutRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" "#,
            r#"ID="{id}" Version="2.0" IssueInstant="{instant}">"#,
            r#"<saml:NameID xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion">@NOT_USED@</saml:NameID>"#,
            r#"<samlp:SessionIndex>{session}</samlp:SessionIndex>"#,
            r#"</samlp:LogoutRequest>"#
        ),
        id = request.id,
        instant = issue_instant.to_rfc3339_opts(SecondsFormat::Secs, true),
        session = request.ticket_id,
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::authentication::Service;

    #[test]
    fn test_message() {
        let mut request = LogoutRequest::new("ST-1-abc", Service::new("https://app.example.org"));
        request.id = "LR-1".into();
        let instant = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert_eq!(
            r#"<samlp:LogoutRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="LR-1" Version="2.0" IssueInstant="2026-10-19T12:00:00Z"><saml:NameID xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion">@NOT_USED@</saml:NameID><samlp:SessionIndex>ST-1-abc</samlp:SessionIndex></samlp:LogoutRequest>"#,
            build_logout_message(&request, instant)
        );
    }
}
