//! Reusable OpenAPI response types for error documentation.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Bad Request",
    content_type = "application/json",
    example = json!({ "error": "Name, price, and type are required" })
)]
pub struct BadRequestResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Not Found",
    content_type = "application/json",
    example = json!({ "error": "Product not found" })
)]
pub struct NotFoundResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Method Not Allowed",
    content_type = "application/json",
    example = json!({ "error": "Method not allowed" })
)]
pub struct MethodNotAllowedResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error with the underlying error message",
    content_type = "application/json",
    example = json!({ "error": "Kind: Server selection timeout" })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);
