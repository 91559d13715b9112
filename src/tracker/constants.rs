/// Name used for the crate-wide logger.
pub(crate) const TRACKER_LOGGER_NAME: &str = "@erralytics/tracker";

/// Command passed as the first argument of every gtag call.
pub(crate) const GTAG_EVENT_COMMAND: &str = "event";

/// Key under which the event name is stored in a dataLayer record.
pub(crate) const DATA_LAYER_EVENT_KEY: &str = "event";

/// Path reported for 404s when no page location is known.
pub(crate) const FALLBACK_PAGE_PATH: &str = "/";

/// Status codes tracked out of the box, with their event names and static messages.
///
/// 404 has no static message; its payload carries the current page path instead.
pub(crate) const DEFAULT_EVENTS: &[(u16, &str, Option<&str>)] = &[
    (400, "bad_request", Some("Dados inválidos enviados")),
    (401, "unauthorized", Some("Acesso não autorizado")),
    (403, "forbidden", Some("Acesso proibido")),
    (404, "page_not_found", None),
    (408, "request_timeout", Some("Tempo de requisição excedido")),
    (429, "too_many_requests", Some("Muitas requisições")),
    (500, "server_error", Some("Erro no servidor")),
    (502, "bad_gateway", Some("Gateway inválido")),
    (503, "service_unavailable", Some("Serviço indisponível")),
    (504, "gateway_timeout", Some("Gateway expirou")),
];
