use isirt_schema::{AuditLogFilters, PaginatedAuditLogs};

use crate::{ApiError, ApiRequest, IsirtClient};

impl IsirtClient {
    pub async fn audit_logs(&self, filters: &AuditLogFilters) -> Result<PaginatedAuditLogs, ApiError> {
        let request = ApiRequest::get("/audit-logs/").query_pairs(filters.to_query());
        self.http.send(request).await
    }
}
