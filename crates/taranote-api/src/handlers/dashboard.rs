use axum::response::Response;
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::handlers::AuthProps;
use crate::inertia::Inertia;

#[derive(Serialize)]
struct DashboardProps<'a> {
    auth: AuthProps<'a>,
}

pub async fn show(CurrentUser(user): CurrentUser, inertia: Inertia) -> Response {
    inertia
        .render(
            "Dashboard",
            DashboardProps {
                auth: AuthProps::new(Some(&user)),
            },
        )
        .await
}
