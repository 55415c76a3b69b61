use actix_web::{error, middleware, web, App, Error, HttpResponse, HttpServer};
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::film_service::FilmService;
use crate::film_storage::FilmStorage;
use crate::memory_film_storage::MemoryFilmStorage;
use crate::memory_user_storage::MemoryUserStorage;
use crate::postgres_film_storage::PostgresFilmStorage;
use crate::postgres_user_storage::PostgresUserStorage;
use crate::user_service::UserService;
use crate::user_storage::UserStorage;

mod film;
mod film_service;
mod film_storage;
mod memory_film_storage;
mod memory_user_storage;
mod postgres;
mod postgres_film_storage;
mod postgres_user_storage;
mod user;
mod user_service;
mod user_storage;

const MAX_SIZE: usize = 262_144; // max payload size is 256k

fn service_error_response(err: &std::io::Error, what: &str) -> HttpResponse {
    log::debug!("{}: {:?}", what, err);
    match err.kind() {
        std::io::ErrorKind::NotFound => HttpResponse::NotFound().json(err.to_string()),
        std::io::ErrorKind::InvalidInput => HttpResponse::BadRequest().json(err.to_string()),
        _ => HttpResponse::InternalServerError().json(what),
    }
}

async fn list_users(service: web::Data<UserService>) -> HttpResponse {
    match service.find_all_users().await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(err) => service_error_response(&err, "unable to fetch users"),
    }
}

async fn get_user(service: web::Data<UserService>, path: web::Path<i64>) -> HttpResponse {
    let id = path.into_inner();
    match service.get_user_by_id(id).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(err) => service_error_response(&err, "unable to fetch user"),
    }
}

async fn create_user(service: web::Data<UserService>, mut payload: web::Payload) -> Result<HttpResponse, Error> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk?;
        if (body.len() + chunk.len()) > MAX_SIZE {
            return Err(error::ErrorBadRequest("overflow"));
        }
        body.extend_from_slice(&chunk);
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct UserCreatePayload {
        name: String,
        email: String,
        birthdate: String,
    }

    let user_data = match serde_json::from_slice::<UserCreatePayload>(&body) {
        Ok(user_data) => user_data,
        Err(err) => {
            log::debug!("unable to parse json data: {:?}", err);
            return Ok(HttpResponse::BadRequest().json("unable to parse json data"));
        }
    };

    let user = match user::User::new(&user_data.name, &user_data.email, &user_data.birthdate) {
        Ok(user) => user,
        Err(e) => {
            log::debug!("user data is incorrect: {:?}", e);
            return Ok(HttpResponse::BadRequest().json("user data is incorrect: ".to_owned() + &e.to_string()));
        }
    };

    match service.create_user(&user).await {
        Ok(created) => Ok(HttpResponse::Ok().json(created)),
        Err(err) => Ok(service_error_response(&err, "unable to create user")),
    }
}

async fn update_user(service: web::Data<UserService>, mut payload: web::Payload) -> Result<HttpResponse, Error> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk?;
        if (body.len() + chunk.len()) > MAX_SIZE {
            return Err(error::ErrorBadRequest("overflow"));
        }
        body.extend_from_slice(&chunk);
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct UserUpdatePayload {
        id: i64,
        name: String,
        email: String,
        birthdate: String,
    }

    let user_data = match serde_json::from_slice::<UserUpdatePayload>(&body) {
        Ok(user_data) => user_data,
        Err(err) => {
            log::debug!("unable to parse json data: {:?}", err);
            return Ok(HttpResponse::BadRequest().json("unable to parse json data"));
        }
    };

    let user = match user::User::new(&user_data.name, &user_data.email, &user_data.birthdate) {
        Ok(user) => user.with_id(user_data.id),
        Err(e) => {
            log::debug!("user data is incorrect: {:?}", e);
            return Ok(HttpResponse::BadRequest().json("user data is incorrect: ".to_owned() + &e.to_string()));
        }
    };

    match service.update_user(&user).await {
        Ok(updated) => Ok(HttpResponse::Ok().json(updated)),
        Err(err) => Ok(service_error_response(&err, "unable to update user")),
    }
}

async fn delete_user(service: web::Data<UserService>, path: web::Path<i64>) -> HttpResponse {
    let id = path.into_inner();
    match service.delete_user(id).await {
        Ok(deleted) => HttpResponse::Ok().json(deleted),
        Err(err) => service_error_response(&err, "unable to delete user"),
    }
}

async fn friend_set(service: web::Data<UserService>, path: web::Path<(i64, i64)>) -> HttpResponse {
    let (user_id, friend_id) = path.into_inner();
    match service.add_friend(user_id, friend_id).await {
        Ok(()) => HttpResponse::Ok().json("ok"),
        Err(err) => service_error_response(&err, "unable to add friend"),
    }
}

async fn friend_delete(service: web::Data<UserService>, path: web::Path<(i64, i64)>) -> HttpResponse {
    let (user_id, friend_id) = path.into_inner();
    match service.delete_friend(user_id, friend_id).await {
        Ok(friend) => HttpResponse::Ok().json(friend),
        Err(err) => service_error_response(&err, "unable to delete friend"),
    }
}

async fn friend_list(service: web::Data<UserService>, path: web::Path<i64>) -> HttpResponse {
    let user_id = path.into_inner();
    match service.get_all_friends(user_id).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(err) => service_error_response(&err, "unable to fetch friends"),
    }
}

async fn friend_common(service: web::Data<UserService>, path: web::Path<(i64, i64)>) -> HttpResponse {
    let (user_id, other_id) = path.into_inner();
    match service.get_common_friends(user_id, other_id).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(err) => service_error_response(&err, "unable to fetch common friends"),
    }
}

async fn list_films(service: web::Data<FilmService>) -> HttpResponse {
    match service.find_all_films().await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(err) => service_error_response(&err, "unable to fetch films"),
    }
}

async fn film_create(service: web::Data<FilmService>, mut payload: web::Payload) -> Result<HttpResponse, Error> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk?;
        if (body.len() + chunk.len()) > MAX_SIZE {
            return Err(error::ErrorBadRequest("overflow"));
        }
        body.extend_from_slice(&chunk);
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct FilmCreatePayload {
        title: String,
        description: String,
        release_date: String,
        duration_minutes: i32,
    }

    let film_data = match serde_json::from_slice::<FilmCreatePayload>(&body) {
        Ok(film_data) => film_data,
        Err(err) => {
            log::debug!("unable to parse json data: {:?}", err);
            return Ok(HttpResponse::BadRequest().json("unable to parse json data"));
        }
    };

    let film = match film::Film::new(&film_data.title, &film_data.description, &film_data.release_date, film_data.duration_minutes) {
        Ok(film) => film,
        Err(e) => {
            log::debug!("film data is incorrect: {:?}", e);
            return Ok(HttpResponse::BadRequest().json("film data is incorrect: ".to_owned() + &e.to_string()));
        }
    };

    match service.create_film(&film).await {
        Ok(created) => Ok(HttpResponse::Ok().json(created)),
        Err(err) => Ok(service_error_response(&err, "unable to create film")),
    }
}

async fn film_update(service: web::Data<FilmService>, mut payload: web::Payload) -> Result<HttpResponse, Error> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk?;
        if (body.len() + chunk.len()) > MAX_SIZE {
            return Err(error::ErrorBadRequest("overflow"));
        }
        body.extend_from_slice(&chunk);
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct FilmUpdatePayload {
        id: i64,
        title: String,
        description: String,
        release_date: String,
        duration_minutes: i32,
    }

    let film_data = match serde_json::from_slice::<FilmUpdatePayload>(&body) {
        Ok(film_data) => film_data,
        Err(err) => {
            log::debug!("unable to parse json data: {:?}", err);
            return Ok(HttpResponse::BadRequest().json("unable to parse json data"));
        }
    };

    let film = match film::Film::new(&film_data.title, &film_data.description, &film_data.release_date, film_data.duration_minutes) {
        Ok(film) => film.with_id(film_data.id),
        Err(e) => {
            log::debug!("film data is incorrect: {:?}", e);
            return Ok(HttpResponse::BadRequest().json("film data is incorrect: ".to_owned() + &e.to_string()));
        }
    };

    match service.update_film(&film).await {
        Ok(updated) => Ok(HttpResponse::Ok().json(updated)),
        Err(err) => Ok(service_error_response(&err, "unable to update film")),
    }
}

async fn film_delete(service: web::Data<FilmService>, path: web::Path<i64>) -> HttpResponse {
    let id = path.into_inner();
    match service.delete_film(id).await {
        Ok(deleted) => HttpResponse::Ok().json(deleted),
        Err(err) => service_error_response(&err, "unable to delete film"),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let storage_backend = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "postgres".into());

    let (user_storage, film_storage): (
        Box<dyn UserStorage + Send + Sync>,
        Box<dyn FilmStorage + Send + Sync>,
    ) = if "memory" == storage_backend {
        (
            Box::new(MemoryUserStorage::new()),
            Box::new(MemoryFilmStorage::new()),
        )
    } else {
        postgres::init_pool().await;
        // postgres::migrate_down(postgres::get_pool_ref()).await;
        postgres::migrate_up(postgres::get_pool_ref()).await;
        (
            Box::new(PostgresUserStorage::new(postgres::get_pool_ref())),
            Box::new(PostgresFilmStorage::new(postgres::get_pool_ref())),
        )
    };

    let user_service = web::Data::new(UserService::new(user_storage).await?);
    let film_service = web::Data::new(FilmService::new(film_storage));

    let http_address = std::env::var("HTTP_SERVER_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8000".into());
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compress::default())
            .app_data(user_service.clone())
            .app_data(film_service.clone())
            .service(web::resource("/user").route(web::get().to(list_users)))
            .service(web::resource("/user/get/{id}").route(web::get().to(get_user)))
            .service(web::resource("/user/create").route(web::post().to(create_user)))
            .service(web::resource("/user/update").route(web::put().to(update_user)))
            .service(web::resource("/user/delete/{id}").route(web::delete().to(delete_user)))
            .service(web::resource("/friend/set/{user_id}/{friend_id}").route(web::put().to(friend_set)))
            .service(web::resource("/friend/delete/{user_id}/{friend_id}").route(web::put().to(friend_delete)))
            .service(web::resource("/friend/list/{user_id}").route(web::get().to(friend_list)))
            .service(web::resource("/friend/common/{user_id}/{other_id}").route(web::get().to(friend_common)))
            .service(web::resource("/film").route(web::get().to(list_films)))
            .service(web::resource("/film/create").route(web::post().to(film_create)))
            .service(web::resource("/film/update").route(web::put().to(film_update)))
            .service(web::resource("/film/delete/{id}").route(web::delete().to(film_delete)))
    })
    .bind(&http_address)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use actix_web::test;

    use super::*;

    async fn user_app_data() -> web::Data<UserService> {
        web::Data::new(UserService::new(Box::new(MemoryUserStorage::new())).await.unwrap())
    }

    #[actix_web::test]
    async fn user_and_friend_routes_round_trip() {
        let user_service = user_app_data().await;
        let app = test::init_service(
            App::new()
                .app_data(user_service.clone())
                .service(web::resource("/user/create").route(web::post().to(create_user)))
                .service(web::resource("/friend/set/{user_id}/{friend_id}").route(web::put().to(friend_set)))
                .service(web::resource("/friend/list/{user_id}").route(web::get().to(friend_list))),
        )
        .await;

        for (name, email) in [("Alice", "alice@example.com"), ("Bob", "bob@example.com")] {
            let req = test::TestRequest::post()
                .uri("/user/create")
                .set_json(serde_json::json!({
                    "name": name,
                    "email": email,
                    "birthdate": "1990-04-12",
                }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert!(resp.status().is_success());
        }

        let req = test::TestRequest::put().uri("/friend/set/1/2").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get().uri("/friend/list/1").to_request();
        let friends: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(1, friends.len());
        assert_eq!(2, friends[0]["id"]);
    }

    #[actix_web::test]
    async fn friend_route_with_missing_user_returns_404() {
        let user_service = user_app_data().await;
        let app = test::init_service(
            App::new()
                .app_data(user_service.clone())
                .service(web::resource("/user/create").route(web::post().to(create_user)))
                .service(web::resource("/friend/set/{user_id}/{friend_id}").route(web::put().to(friend_set))),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/user/create")
            .set_json(serde_json::json!({
                "name": "Alice",
                "email": "alice@example.com",
                "birthdate": "1990-04-12",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::put().uri("/friend/set/1/99").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(404, resp.status().as_u16());
    }

    #[actix_web::test]
    async fn invalid_user_payload_returns_400() {
        let user_service = user_app_data().await;
        let app = test::init_service(
            App::new()
                .app_data(user_service.clone())
                .service(web::resource("/user/create").route(web::post().to(create_user))),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/user/create")
            .set_json(serde_json::json!({
                "name": "Alice",
                "email": "not-an-email",
                "birthdate": "1990-04-12",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(400, resp.status().as_u16());
    }

    #[actix_web::test]
    async fn film_routes_round_trip() {
        let film_service = web::Data::new(FilmService::new(Box::new(MemoryFilmStorage::new())));
        let app = test::init_service(
            App::new()
                .app_data(film_service.clone())
                .service(web::resource("/film").route(web::get().to(list_films)))
                .service(web::resource("/film/create").route(web::post().to(film_create)))
                .service(web::resource("/film/delete/{id}").route(web::delete().to(film_delete))),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/film/create")
            .set_json(serde_json::json!({
                "title": "Solaris",
                "description": "A psychologist is sent to a space station.",
                "release_date": "1972-03-20",
                "duration_minutes": 167,
            }))
            .to_request();
        let created: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(1, created["id"]);

        let req = test::TestRequest::get().uri("/film").to_request();
        let films: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(1, films.len());

        let req = test::TestRequest::delete().uri("/film/delete/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::delete().uri("/film/delete/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(404, resp.status().as_u16());
    }
}
