use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Category, Comment, CommissionPolicy, Errors, Role, User, DEFAULT_RATE_BPS};
use crate::marketplace::Marketplace;
use crate::stats;
use super::auth;
use super::types::{
    ApiResponse, AuctionDetail, AuctionListQuery, AuctionSummary, BidRequest, CategoryRequest,
    CategoryUpdateRequest, CommentRequest, CommissionRequest, CreateAuctionRequest, LoginRequest,
    LoginResponse, OfferCreated, OfferRequest, OfferResponseRequest, PasswordResetConfirm,
    PasswordResetRequest, PaymentMethodRequest, RegisterRequest, ResetTokenResponse, UserProfile,
    WatchCount,
};

fn respond<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(data))
}

fn respond_created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::ok(data))
}

fn fail(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse::failure(message))
}

fn status_for(err: &Errors) -> StatusCode {
    match err {
        Errors::InvalidCredentials => StatusCode::UNAUTHORIZED,

        Errors::SellerCannotPlaceBids(_)
        | Errors::SellerCannotMakeOffers(_)
        | Errors::NotAuctionSeller(_)
        | Errors::NotOfferBuyer(_)
        | Errors::AdminOnly(_)
        | Errors::SellerRoleRequired(_) => StatusCode::FORBIDDEN,

        Errors::UnknownAuction(_)
        | Errors::UnknownUser(_)
        | Errors::UnknownOffer(_)
        | Errors::UnknownCategory(_)
        | Errors::UnknownPayment(_) => StatusCode::NOT_FOUND,

        Errors::VersionConflict(_) => StatusCode::CONFLICT,

        Errors::Payment(_) => StatusCode::INTERNAL_SERVER_ERROR,

        _ => StatusCode::BAD_REQUEST,
    }
}

fn error_response(err: Errors) -> HttpResponse {
    fail(status_for(&err), err.to_string())
}

/// Resolves the request's token to a current user record.
fn require_user(req: &HttpRequest, marketplace: &Marketplace) -> std::result::Result<User, HttpResponse> {
    let token = match auth::token_from_request(req) {
        Some(token) => token,
        None => return Err(fail(StatusCode::UNAUTHORIZED, "Missing credentials")),
    };
    let payload = match auth::parse_token(&token) {
        Some(payload) => payload,
        None => return Err(fail(StatusCode::UNAUTHORIZED, "Invalid token")),
    };
    marketplace
        .db
        .get_user(&payload.sub)
        .map_err(|_| fail(StatusCode::UNAUTHORIZED, "Unknown user"))
}

fn require_admin(user: &User) -> std::result::Result<(), HttpResponse> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(error_response(Errors::AdminOnly(user.user_id.clone())))
    }
}

// --- users

async fn register(
    body: web::Json<RegisterRequest>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let role = match body.role {
        Some(Role::Admin) => {
            return Ok(fail(
                StatusCode::BAD_REQUEST,
                "Cannot self-register as admin",
            ))
        }
        Some(role) => role,
        None => Role::Bidder,
    };
    if body.user_id.trim().is_empty() || body.password.is_empty() {
        return Ok(fail(StatusCode::BAD_REQUEST, "user id and password required"));
    }

    let password_hash = match auth::hash_password(&body.password) {
        Ok(hash) => hash,
        Err(err) => return Ok(error_response(err)),
    };
    let user = User {
        user_id: body.user_id.clone(),
        name: body.name.clone(),
        role,
        password_hash,
        payment_verified: false,
        customer_ref: None,
        payment_method_ref: None,
        reset_token: None,
    };

    match data.db.insert_user(user.clone()) {
        Ok(()) => Ok(respond_created(LoginResponse {
            token: auth::issue_token(&user),
            profile: UserProfile::from(&user),
        })),
        Err(err) => Ok(error_response(err)),
    }
}

async fn login(body: web::Json<LoginRequest>, data: web::Data<Marketplace>) -> Result<HttpResponse> {
    let user = match data.db.get_user(&body.user_id) {
        Ok(user) => user,
        Err(_) => return Ok(error_response(Errors::InvalidCredentials)),
    };
    if !auth::verify_password(&body.password, &user.password_hash) {
        return Ok(error_response(Errors::InvalidCredentials));
    }
    Ok(respond(LoginResponse {
        token: auth::issue_token(&user),
        profile: UserProfile::from(&user),
    }))
}

/// Email delivery is out of scope, so the token comes back in the response.
async fn password_reset(
    body: web::Json<PasswordResetRequest>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let mut user = match data.db.get_user(&body.user_id) {
        Ok(user) => user,
        Err(err) => return Ok(error_response(err)),
    };
    let token = Uuid::new_v4().to_string();
    user.reset_token = Some(token.clone());
    match data.db.update_user(user) {
        Ok(()) => Ok(respond(ResetTokenResponse { reset_token: token })),
        Err(err) => Ok(error_response(err)),
    }
}

async fn password_reset_confirm(
    body: web::Json<PasswordResetConfirm>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let mut user = match data.db.get_user(&body.user_id) {
        Ok(user) => user,
        Err(err) => return Ok(error_response(err)),
    };
    if user.reset_token.as_deref() != Some(body.token.as_str()) {
        return Ok(error_response(Errors::InvalidResetToken));
    }
    user.password_hash = match auth::hash_password(&body.new_password) {
        Ok(hash) => hash,
        Err(err) => return Ok(error_response(err)),
    };
    user.reset_token = None;
    match data.db.update_user(user) {
        Ok(()) => Ok(respond("password updated")),
        Err(err) => Ok(error_response(err)),
    }
}

async fn me(req: HttpRequest, data: web::Data<Marketplace>) -> Result<HttpResponse> {
    match require_user(&req, &data) {
        Ok(user) => Ok(respond(UserProfile::from(&user))),
        Err(resp) => Ok(resp),
    }
}

async fn my_payments(req: HttpRequest, data: web::Data<Marketplace>) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    Ok(respond(data.db.payments_for_user(&user.user_id)))
}

async fn my_watchlist(req: HttpRequest, data: web::Data<Marketplace>) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    Ok(respond(data.db.watchlist(&user.user_id)))
}

async fn update_payment_method(
    req: HttpRequest,
    body: web::Json<PaymentMethodRequest>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    match data
        .payments
        .update_payment_method(&user.user_id, &body.customer_ref, &body.method_ref)
        .await
    {
        Ok(summary) => Ok(respond(summary)),
        Err(err) => Ok(error_response(err)),
    }
}

// --- auctions

async fn list_auctions(
    query: web::Query<AuctionListQuery>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let auctions: Vec<AuctionSummary> = data
        .db
        .list_auctions()
        .iter()
        .filter(|a| query.status.map_or(true, |status| a.status == status))
        .filter(|a| {
            query
                .category
                .as_ref()
                .map_or(true, |category| a.category == *category)
        })
        .map(AuctionSummary::from)
        .collect();
    Ok(respond(auctions))
}

async fn create_auction(
    req: HttpRequest,
    body: web::Json<CreateAuctionRequest>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    match data.create_listing(&user, body.to_auction(&user)) {
        Ok(auction) => Ok(respond_created(AuctionDetail::from(&auction))),
        Err(err) => Ok(error_response(err)),
    }
}

async fn get_auction(
    path: web::Path<i64>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    match data.db.get_auction(path.into_inner()) {
        Ok(auction) => Ok(respond(AuctionDetail::from(&auction))),
        Err(err) => Ok(error_response(err)),
    }
}

async fn cancel_auction(
    req: HttpRequest,
    path: web::Path<i64>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    match data.cancel(path.into_inner(), &user).await {
        Ok(auction) => Ok(respond(AuctionDetail::from(&auction))),
        Err(err) => Ok(error_response(err)),
    }
}

async fn place_bid(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<BidRequest>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    match data
        .place_bid(path.into_inner(), &user.user_id, body.amount, Utc::now())
        .await
    {
        Ok(auction) => Ok(respond(AuctionDetail::from(&auction))),
        Err(err) => Ok(error_response(err)),
    }
}

async fn buy_now(
    req: HttpRequest,
    path: web::Path<i64>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    match data.buy_now(path.into_inner(), &user.user_id, Utc::now()).await {
        Ok(auction) => Ok(respond(AuctionDetail::from(&auction))),
        Err(err) => Ok(error_response(err)),
    }
}

async fn make_offer(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<OfferRequest>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    match data.make_offer(path.into_inner(), &user.user_id, body.amount, Utc::now()) {
        Ok((_, offer_id)) => Ok(respond_created(OfferCreated { offer_id })),
        Err(err) => Ok(error_response(err)),
    }
}

async fn respond_to_offer(
    req: HttpRequest,
    path: web::Path<(i64, Uuid)>,
    body: web::Json<OfferResponseRequest>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let (auction_id, offer_id) = path.into_inner();
    match data
        .respond_to_offer(auction_id, &user.user_id, offer_id, body.accept)
        .await
    {
        Ok(auction) => Ok(respond(AuctionDetail::from(&auction))),
        Err(err) => Ok(error_response(err)),
    }
}

async fn withdraw_offer(
    req: HttpRequest,
    path: web::Path<(i64, Uuid)>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let (auction_id, offer_id) = path.into_inner();
    match data.withdraw_offer(auction_id, &user.user_id, offer_id) {
        Ok(auction) => Ok(respond(AuctionDetail::from(&auction))),
        Err(err) => Ok(error_response(err)),
    }
}

async fn approve_auction(
    req: HttpRequest,
    path: web::Path<i64>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = require_admin(&user) {
        return Ok(resp);
    }
    match data.approve(path.into_inner()) {
        Ok(auction) => Ok(respond(AuctionDetail::from(&auction))),
        Err(err) => Ok(error_response(err)),
    }
}

async fn end_auction(
    req: HttpRequest,
    path: web::Path<i64>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = require_admin(&user) {
        return Ok(resp);
    }
    match data.end_auction(path.into_inner()).await {
        Ok(auction) => Ok(respond(AuctionDetail::from(&auction))),
        Err(err) => Ok(error_response(err)),
    }
}

async fn watch(
    req: HttpRequest,
    path: web::Path<i64>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    match data.db.watch(&user.user_id, path.into_inner()) {
        Ok(watch_count) => Ok(respond(WatchCount { watch_count })),
        Err(err) => Ok(error_response(err)),
    }
}

async fn unwatch(
    req: HttpRequest,
    path: web::Path<i64>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    match data.db.unwatch(&user.user_id, path.into_inner()) {
        Ok(watch_count) => Ok(respond(WatchCount { watch_count })),
        Err(err) => Ok(error_response(err)),
    }
}

async fn list_comments(
    path: web::Path<i64>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let auction_id = path.into_inner();
    if let Err(err) = data.db.get_auction(auction_id) {
        return Ok(error_response(err));
    }
    Ok(respond(data.db.comments_for_auction(auction_id)))
}

async fn add_comment(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<CommentRequest>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let auction_id = path.into_inner();
    if let Err(err) = data.db.get_auction(auction_id) {
        return Ok(error_response(err));
    }
    if body.text.trim().is_empty() {
        return Ok(fail(StatusCode::BAD_REQUEST, "comment text required"));
    }
    let comment = Comment {
        comment_id: Uuid::new_v4(),
        auction_id,
        author: user.user_id,
        text: body.text.clone(),
        at: Utc::now(),
    };
    data.db.add_comment(comment.clone());
    Ok(respond_created(comment))
}

// --- categories and commissions

async fn list_categories(data: web::Data<Marketplace>) -> Result<HttpResponse> {
    Ok(respond(data.db.list_categories()))
}

async fn create_category(
    req: HttpRequest,
    body: web::Json<CategoryRequest>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = require_admin(&user) {
        return Ok(resp);
    }
    let category = Category {
        id: body.id.clone(),
        name: body.name.clone(),
        created_by: user.user_id,
    };
    match data.db.insert_category(category.clone()) {
        Ok(()) => Ok(respond_created(category)),
        Err(err) => Ok(error_response(err)),
    }
}

async fn update_category(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<CategoryUpdateRequest>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = require_admin(&user) {
        return Ok(resp);
    }
    let id = path.into_inner();
    let mut category = match data.db.get_category(&id) {
        Ok(category) => category,
        Err(err) => return Ok(error_response(err)),
    };
    category.name = body.name.clone();
    match data.db.update_category(category.clone()) {
        Ok(()) => Ok(respond(category)),
        Err(err) => Ok(error_response(err)),
    }
}

async fn delete_category(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = require_admin(&user) {
        return Ok(resp);
    }
    match data.db.delete_category(&path.into_inner()) {
        Ok(()) => Ok(respond("category deleted")),
        Err(err) => Ok(error_response(err)),
    }
}

async fn get_commission(
    path: web::Path<String>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let category = path.into_inner();
    if let Err(err) = data.db.get_category(&category) {
        return Ok(error_response(err));
    }
    let policy = data
        .db
        .commission_policy(&category)
        .unwrap_or(CommissionPolicy {
            category,
            rate_bps: DEFAULT_RATE_BPS,
            cap: None,
        });
    Ok(respond(policy))
}

async fn set_commission(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<CommissionRequest>,
    data: web::Data<Marketplace>,
) -> Result<HttpResponse> {
    let user = match require_user(&req, &data) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = require_admin(&user) {
        return Ok(resp);
    }
    let category = path.into_inner();
    if let Err(err) = data.db.get_category(&category) {
        return Ok(error_response(err));
    }
    let policy = CommissionPolicy {
        category,
        rate_bps: body.rate_bps,
        cap: body.cap,
    };
    data.db.set_commission_policy(policy.clone());
    Ok(respond(policy))
}

// --- statistics

async fn marketplace_stats(data: web::Data<Marketplace>) -> Result<HttpResponse> {
    Ok(respond(stats::marketplace_stats(&data.db)))
}

async fn user_stats(path: web::Path<String>, data: web::Data<Marketplace>) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    if let Err(err) = data.db.get_user(&user_id) {
        return Ok(error_response(err));
    }
    Ok(respond(stats::user_stats(&data.db, &user_id)))
}

// Configure routes
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            .route("/users/register", web::post().to(register))
            .route("/users/login", web::post().to(login))
            .route("/users/password-reset", web::post().to(password_reset))
            .route(
                "/users/password-reset/confirm",
                web::post().to(password_reset_confirm),
            )
            .route("/users/me", web::get().to(me))
            .route("/users/me/payments", web::get().to(my_payments))
            .route("/users/me/watchlist", web::get().to(my_watchlist))
            .route(
                "/users/me/payment-method",
                web::put().to(update_payment_method),
            )
            .route("/auctions", web::get().to(list_auctions))
            .route("/auctions", web::post().to(create_auction))
            .route("/auctions/{id}", web::get().to(get_auction))
            .route("/auctions/{id}", web::delete().to(cancel_auction))
            .route("/auctions/{id}/bids", web::post().to(place_bid))
            .route("/auctions/{id}/buy-now", web::post().to(buy_now))
            .route("/auctions/{id}/offers", web::post().to(make_offer))
            .route(
                "/auctions/{id}/offers/{offer_id}/response",
                web::post().to(respond_to_offer),
            )
            .route(
                "/auctions/{id}/offers/{offer_id}",
                web::delete().to(withdraw_offer),
            )
            .route("/auctions/{id}/approve", web::post().to(approve_auction))
            .route("/auctions/{id}/end", web::post().to(end_auction))
            .route("/auctions/{id}/watch", web::put().to(watch))
            .route("/auctions/{id}/watch", web::delete().to(unwatch))
            .route("/auctions/{id}/comments", web::get().to(list_comments))
            .route("/auctions/{id}/comments", web::post().to(add_comment))
            .route("/categories", web::get().to(list_categories))
            .route("/categories", web::post().to(create_category))
            .route("/categories/{id}", web::put().to(update_category))
            .route("/categories/{id}", web::delete().to(delete_category))
            .route("/commissions/{category}", web::get().to(get_commission))
            .route("/commissions/{category}", web::put().to(set_commission))
            .route("/stats", web::get().to(marketplace_stats))
            .route("/stats/users/{id}", web::get().to(user_stats)),
    );
}
