use actix_web::web;

mod absence;
mod attendance;
mod auth;
mod payroll;
mod sync;
mod transactions;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(web::scope("/auth")
            .configure(auth::config))
        .service(web::scope("/attendance")
            .configure(attendance::config))
        .service(web::scope("/sync")
            .configure(sync::config))
        .service(web::scope("/transactions")
            .configure(transactions::config))
        .service(web::scope("/absences")
            .configure(absence::config))
        .service(web::scope("/payroll")
            .configure(payroll::config));
}
