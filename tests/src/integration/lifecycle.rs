//! # Aval Lifecycle Through the Request Boundary
//!
//! Issue → edit → void → rejected edit, checking status codes and bodies the
//! form layer relies on.

#[cfg(test)]
mod tests {
    use aval_registry::adapters::api_handler::{ApiRequest, AvalApiHandler};
    use aval_registry::{AvalFilters, AvalRegistryApi, Estado, InMemoryRegistry};
    use serde_json::{json, Value};

    use crate::memory_registry;

    fn call(handler: &mut AvalApiHandler<InMemoryRegistry>, request: Value) -> (u16, Value) {
        let request: ApiRequest = serde_json::from_value(request).unwrap();
        let response = handler.handle(request);
        (response.status, response.body)
    }

    fn create_body(solicitante: &str) -> Value {
        json!({
            "op": "create_aval",
            "payload": {
                "fecha_registro": "05/03/2024",
                "fecha_solicitud": "2024-03-04",
                "direccion_administrativa": "DSST",
                "unidad_institucion": "Soporte Técnico",
                "nombre_solicitante": solicitante,
                "cargo": "Analista",
                "responsable": "Luis Gómez",
                "memorando_solicitud": "MEM-2024-001"
            }
        })
    }

    #[test]
    fn test_issue_edit_void_scenario() {
        let mut handler = AvalApiHandler::new(memory_registry());

        let (status, body) = call(&mut handler, create_body("Ana Pérez"));
        assert_eq!(status, 201);
        assert_eq!(body["id"], 1);
        assert_eq!(body["correlativo"], "DTI|DSST|AVAL|0001");
        assert_eq!(body["fecha_registro"], "2024-03-05");
        assert_eq!(body["estado"], "ACTIVO");
        assert!(body["updated_at"].is_null());

        let (status, body) = call(
            &mut handler,
            json!({ "op": "edit_aval", "id": 1, "fields": { "cargo": "Jefa de Unidad" } }),
        );
        assert_eq!(status, 200);
        assert_eq!(body["cargo"], "Jefa de Unidad");
        assert_eq!(body["correlativo"], "DTI|DSST|AVAL|0001");
        assert!(body["updated_at"].is_string());

        let (status, body) = call(
            &mut handler,
            json!({ "op": "void_aval", "id": 1, "motivo": "Solicitud duplicada" }),
        );
        assert_eq!(status, 200);
        assert_eq!(body["estado"], "ANULADO");
        assert_eq!(body["motivo_anulacion"], "Solicitud duplicada");
        assert!(body["anulado_at"].is_string());

        let (status, body) = call(
            &mut handler,
            json!({ "op": "edit_aval", "id": 1, "fields": { "cargo": "Otro" } }),
        );
        assert_eq!(status, 400);
        assert_eq!(body["kind"], "Immutable");

        let (status, body) = call(
            &mut handler,
            json!({ "op": "void_aval", "id": 1, "motivo": "otra vez" }),
        );
        assert_eq!(status, 400);
        assert_eq!(body["kind"], "AlreadyVoided");

        let record = handler.service().get_aval(1).unwrap();
        assert_eq!(record.estado(), Estado::Voided);
        assert_eq!(record.cargo, "Jefa de Unidad");
    }

    #[test]
    fn test_voided_record_keeps_its_number() {
        let mut handler = AvalApiHandler::new(memory_registry());

        call(&mut handler, create_body("Ana"));
        call(&mut handler, json!({ "op": "void_aval", "id": 1, "motivo": "error" }));
        let (_, body) = call(&mut handler, create_body("Luis"));

        assert_eq!(body["correlativo"], "DTI|DSST|AVAL|0002");

        let page = handler
            .service()
            .list_avales(&AvalFilters::new(), None)
            .unwrap();
        let codes: Vec<&str> = page.items.iter().map(|r| r.correlativo()).collect();
        assert_eq!(codes, vec!["DTI|DSST|AVAL|0002", "DTI|DSST|AVAL|0001"]);
    }

    #[test]
    fn test_rejections_do_not_consume_numbers() {
        let mut handler = AvalApiHandler::new(memory_registry());

        let mut incomplete = create_body("Ana");
        incomplete["payload"]["cargo"] = json!("   ");
        incomplete["payload"]["fecha_registro"] = json!("31/02/2024");
        let (status, body) = call(&mut handler, incomplete);
        assert_eq!(status, 400);
        assert_eq!(body["kind"], "ValidationError");

        let (status, body) = call(&mut handler, create_body("Ana"));
        assert_eq!(status, 201);
        assert_eq!(body["correlativo"], "DTI|DSST|AVAL|0001");
    }

    #[test]
    fn test_forbidden_and_unknown_targets() {
        let mut handler = AvalApiHandler::new(memory_registry());
        call(&mut handler, create_body("Ana"));

        let (status, body) = call(
            &mut handler,
            json!({ "op": "edit_aval", "id": 1, "fields": { "correlativo": "X|9999" } }),
        );
        assert_eq!(status, 400);
        assert_eq!(body["kind"], "ForbiddenField");
        assert_eq!(body["fields"], json!(["correlativo"]));

        let (status, body) = call(&mut handler, json!({ "op": "get_aval", "id": 77 }));
        assert_eq!(status, 404);
        assert_eq!(body["kind"], "NotFound");

        let (status, _) = call(&mut handler, json!({ "op": "get_aval", "id": 0 }));
        assert_eq!(status, 400);
    }

    #[test]
    fn test_list_shapes() {
        let mut handler = AvalApiHandler::new(memory_registry());
        for name in ["Ana", "Luis", "Marta"] {
            call(&mut handler, create_body(name));
        }

        let (status, body) = call(
            &mut handler,
            json!({ "op": "list_avales", "filters": { "solicitante": "a" } }),
        );
        assert_eq!(status, 200);
        assert_eq!(body.as_array().map(Vec::len), Some(3));

        let (status, body) = call(
            &mut handler,
            json!({ "op": "list_avales", "limit": 2, "offset": 2 }),
        );
        assert_eq!(status, 200);
        assert_eq!(body["total"], 3);
        assert_eq!(body["items"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["items"][0]["nombre_solicitante"], "Ana");
    }
}
