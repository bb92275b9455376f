//! End-to-end recipe scenarios over the in-memory adapters.

#[path = "support/http.rs"]
mod http;

use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::test::{self as actix_test, TestRequest};
use foodgram::domain::RecipeId;
use foodgram::domain::ports::RecipeList;
use foodgram::test_support::InMemoryStore;
use http::{app, create_recipe, recipe_body, send, signed_in_user};
use rstest::{fixture, rstest};
use serde_json::json;

struct Catalogue {
    egg: i64,
    flour: i64,
    breakfast: i64,
    lunch: i64,
}

#[fixture]
fn store() -> InMemoryStore {
    InMemoryStore::new()
}

fn seed(store: &InMemoryStore) -> Catalogue {
    Catalogue {
        egg: store.add_ingredient("egg", "pcs").id.get(),
        flour: store.add_ingredient("flour", "g").id.get(),
        breakfast: store.add_tag("Breakfast", "breakfast").id.get(),
        lunch: store.add_tag("Lunch", "lunch").id.get(),
    }
}

fn recipe_uri(id: i64, action: &str) -> String {
    format!("/api/recipes/{id}/{action}")
}

#[rstest]
#[actix_web::test]
async fn created_recipe_is_readable_anonymously(store: InMemoryStore) {
    let catalogue = seed(&store);
    let app = actix_test::init_service(app(&store)).await;
    let (anna, anna_id) = signed_in_user(&app, "anna").await;

    let lines = [(catalogue.egg, 2), (catalogue.flour, 200)];
    let id = create_recipe(
        &app,
        &anna,
        recipe_body("Pancakes", &lines, &[catalogue.breakfast]),
    )
    .await;

    let (status, body) = send(&app, TestRequest::get().uri(&recipe_uri(id, "")), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Pancakes");
    assert_eq!(body["author"]["id"], anna_id);
    assert_eq!(body["author"]["is_subscribed"], false);
    assert_eq!(body["is_favorited"], false);
    assert_eq!(body["is_in_shopping_cart"], false);
    assert_eq!(body["tags"][0]["slug"], "breakfast");
    assert_eq!(body["ingredients"].as_array().map(Vec::len), Some(2));
    let image = body["image"].as_str().expect("image url");
    assert!(
        image.starts_with("http://testserver/media/recipes/images/"),
        "{image}"
    );

    let media_path = image.trim_start_matches("http://testserver");
    let res =
        actix_test::call_service(&app, TestRequest::get().uri(media_path).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("image/png")
    );
}

#[rstest]
#[case::empty_tags("tags", "blank")]
#[case::missing_image("image", "missing_field")]
#[case::zero_cooking_time("cooking_time", "out_of_range")]
#[case::duplicate_ingredient("duplicate_ingredient", "duplicate")]
#[case::unknown_ingredient("unknown_ingredient", "unknown_ingredient")]
#[case::unknown_tag("unknown_tag", "unknown_tag")]
#[actix_web::test]
async fn invalid_recipes_are_rejected(
    store: InMemoryStore,
    #[case] defect: &str,
    #[case] code: &str,
) {
    let catalogue = seed(&store);
    let app = actix_test::init_service(app(&store)).await;
    let (anna, _) = signed_in_user(&app, "anna").await;
    let mut body = recipe_body("Broken", &[(catalogue.egg, 1)], &[catalogue.breakfast]);
    let field = match defect {
        "tags" => {
            body["tags"] = json!([]);
            "tags"
        }
        "image" => {
            if let Some(fields) = body.as_object_mut() {
                fields.remove("image");
            }
            "image"
        }
        "cooking_time" => {
            body["cooking_time"] = json!(0);
            "cooking_time"
        }
        "duplicate_ingredient" => {
            body["ingredients"] = json!([
                {"id": catalogue.egg, "amount": 1},
                {"id": catalogue.egg, "amount": 2}
            ]);
            "ingredients"
        }
        "unknown_ingredient" => {
            body["ingredients"] = json!([{"id": 999, "amount": 1}]);
            "ingredients"
        }
        "unknown_tag" => {
            body["tags"] = json!([999]);
            "tags"
        }
        other => panic!("unhandled defect {other}"),
    };

    let (status, error) = send(
        &app,
        TestRequest::post().uri("/api/recipes/").set_json(body),
        Some(&anna),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST, "{error}");
    assert_eq!(error["code"], "invalid_request");
    assert_eq!(error["details"]["field"], field, "{error}");
    assert_eq!(error["details"]["code"], code, "{error}");
    let (_, listing) = send(&app, TestRequest::get().uri("/api/recipes/"), None).await;
    assert_eq!(listing["count"], 0);
}

#[rstest]
#[actix_web::test]
async fn only_the_author_may_edit_or_delete(store: InMemoryStore) {
    let catalogue = seed(&store);
    let app = actix_test::init_service(app(&store)).await;
    let (anna, _) = signed_in_user(&app, "anna").await;
    let (boris, _) = signed_in_user(&app, "boris").await;
    let id = create_recipe(
        &app,
        &anna,
        recipe_body("Soup", &[(catalogue.egg, 1)], &[catalogue.lunch]),
    )
    .await;
    let uri = recipe_uri(id, "");
    let mut update = recipe_body("Better soup", &[(catalogue.flour, 50)], &[catalogue.lunch]);
    update["image"] = serde_json::Value::Null;
    let patch = || TestRequest::patch().uri(&uri).set_json(&update);

    let (status, _) = send(&app, patch(), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, patch(), Some(&boris)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, TestRequest::delete().uri(&uri), Some(&boris)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, patch(), Some(&anna)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Better soup");
    assert_eq!(body["ingredients"][0]["name"], "flour");
    assert!(body["image"].as_str().is_some_and(|url| url.ends_with(".png")));
}

#[rstest]
#[actix_web::test]
async fn patch_with_only_relations_keeps_other_fields(store: InMemoryStore) {
    let catalogue = seed(&store);
    let app = actix_test::init_service(app(&store)).await;
    let (anna, _) = signed_in_user(&app, "anna").await;
    let id = create_recipe(
        &app,
        &anna,
        recipe_body("Soup", &[(catalogue.flour, 100)], &[catalogue.breakfast]),
    )
    .await;
    let (_, before) = send(&app, TestRequest::get().uri(&recipe_uri(id, "")), None).await;

    let (status, body) = send(
        &app,
        TestRequest::patch().uri(&recipe_uri(id, "")).set_json(json!({
            "ingredients": [{"id": catalogue.egg, "amount": 3}],
            "tags": [catalogue.lunch],
        })),
        Some(&anna),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["name"], "Soup");
    assert_eq!(body["text"], before["text"]);
    assert_eq!(body["cooking_time"], 15);
    assert_eq!(body["image"], before["image"]);
    assert_eq!(body["ingredients"][0]["name"], "egg");
    assert_eq!(body["ingredients"][0]["amount"], 3);
    assert_eq!(body["tags"][0]["slug"], "lunch");
}

#[rstest]
#[actix_web::test]
async fn patch_without_ingredients_is_rejected(store: InMemoryStore) {
    let catalogue = seed(&store);
    let app = actix_test::init_service(app(&store)).await;
    let (anna, _) = signed_in_user(&app, "anna").await;
    let id = create_recipe(
        &app,
        &anna,
        recipe_body("Soup", &[(catalogue.egg, 1)], &[catalogue.lunch]),
    )
    .await;

    let (status, error) = send(
        &app,
        TestRequest::patch()
            .uri(&recipe_uri(id, ""))
            .set_json(json!({"name": "Stew", "tags": [catalogue.lunch]})),
        Some(&anna),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["details"]["field"], "ingredients");
    assert_eq!(error["details"]["code"], "missing_field");
}

#[rstest]
#[actix_web::test]
async fn favouriting_twice_conflicts_and_keeps_one_row(store: InMemoryStore) {
    let catalogue = seed(&store);
    let app = actix_test::init_service(app(&store)).await;
    let (anna, _) = signed_in_user(&app, "anna").await;
    let id = create_recipe(
        &app,
        &anna,
        recipe_body("Toast", &[(catalogue.flour, 100)], &[catalogue.breakfast]),
    )
    .await;
    let uri = recipe_uri(id, "favorite/");

    let (status, summary) = send(&app, TestRequest::post().uri(&uri), Some(&anna)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(summary["id"], id);
    assert_eq!(summary["cooking_time"], 15);
    let (status, error) = send(&app, TestRequest::post().uri(&uri), Some(&anna)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "conflict");
    assert_eq!(
        store.membership_count(RecipeList::Favorites, RecipeId::new(id)),
        1
    );

    let (status, body) = send(
        &app,
        TestRequest::get().uri(&recipe_uri(id, "")),
        Some(&anna),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_favorited"], true);

    let (status, _) = send(&app, TestRequest::delete().uri(&uri), Some(&anna)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, TestRequest::delete().uri(&uri), Some(&anna)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn shopping_cart_download_sums_by_ingredient(store: InMemoryStore) {
    let catalogue = seed(&store);
    let app = actix_test::init_service(app(&store)).await;
    let (anna, _) = signed_in_user(&app, "anna").await;
    let tags = [catalogue.breakfast];
    let first = create_recipe(
        &app,
        &anna,
        recipe_body("Omelette", &[(catalogue.egg, 1), (catalogue.flour, 100)], &tags),
    )
    .await;
    let second = create_recipe(
        &app,
        &anna,
        recipe_body("Crepes", &[(catalogue.flour, 200), (catalogue.egg, 1)], &tags),
    )
    .await;
    for id in [first, second] {
        let (status, _) = send(
            &app,
            TestRequest::post().uri(&recipe_uri(id, "shopping_cart/")),
            Some(&anna),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, list) = send(
        &app,
        TestRequest::get().uri("/api/recipes/download_shopping_cart/"),
        Some(&anna),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, "egg - 2 pcs\nflour - 300 g\n");

    let res = actix_test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/recipes/download_shopping_cart/")
            .cookie(anna.clone())
            .to_request(),
    )
    .await;
    let disposition = res
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("content disposition");
    assert!(disposition.contains("attachment"), "{disposition}");
    assert!(disposition.contains("shopping_list.txt"), "{disposition}");
}

#[rstest]
#[actix_web::test]
async fn shopping_cart_download_requires_session(store: InMemoryStore) {
    let app = actix_test::init_service(app(&store)).await;
    let (status, error) = send(
        &app,
        TestRequest::get().uri("/api/recipes/download_shopping_cart/"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error["code"], "unauthorized");
}

#[rstest]
#[actix_web::test]
async fn short_link_is_stable_and_redirects(store: InMemoryStore) {
    let catalogue = seed(&store);
    let app = actix_test::init_service(app(&store)).await;
    let (anna, _) = signed_in_user(&app, "anna").await;
    let id = create_recipe(
        &app,
        &anna,
        recipe_body("Salad", &[(catalogue.egg, 3)], &[catalogue.lunch]),
    )
    .await;
    let uri = recipe_uri(id, "get-link/");

    let (status, first) = send(&app, TestRequest::get().uri(&uri), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = send(&app, TestRequest::get().uri(&uri), Some(&anna)).await;
    let link = first["short-link"].as_str().expect("short link").to_owned();
    assert_eq!(second["short-link"], link.as_str());
    assert!(link.starts_with("http://testserver/s/"), "{link}");

    let path = link.trim_start_matches("http://testserver");
    let expected = format!("http://testserver/recipes/{id}");
    for target in [path.to_owned(), format!("{path}/")] {
        let res =
            actix_test::call_service(&app, TestRequest::get().uri(&target).to_request()).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        let location = res
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok());
        assert_eq!(location, Some(expected.as_str()));
    }

    let res =
        actix_test::call_service(&app, TestRequest::get().uri("/s/zzzzzz/").to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn deleting_a_recipe_cascades(store: InMemoryStore) {
    let catalogue = seed(&store);
    let app = actix_test::init_service(app(&store)).await;
    let (anna, _) = signed_in_user(&app, "anna").await;
    let (boris, _) = signed_in_user(&app, "boris").await;
    let id = create_recipe(
        &app,
        &anna,
        recipe_body("Stew", &[(catalogue.egg, 1)], &[catalogue.lunch]),
    )
    .await;
    for action in ["favorite/", "shopping_cart/"] {
        send(
            &app,
            TestRequest::post().uri(&recipe_uri(id, action)),
            Some(&boris),
        )
        .await;
    }
    let (_, link) = send(
        &app,
        TestRequest::get().uri(&recipe_uri(id, "get-link/")),
        None,
    )
    .await;

    let (status, _) = send(
        &app,
        TestRequest::delete().uri(&recipe_uri(id, "")),
        Some(&anna),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let recipe = RecipeId::new(id);
    assert!(!store.has_recipe(recipe));
    assert_eq!(store.membership_count(RecipeList::Favorites, recipe), 0);
    assert_eq!(store.membership_count(RecipeList::ShoppingCart, recipe), 0);
    let (status, _) = send(&app, TestRequest::get().uri(&recipe_uri(id, "")), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, list) = send(
        &app,
        TestRequest::get().uri("/api/recipes/download_shopping_cart/"),
        Some(&boris),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, serde_json::Value::Null);
    let short_path = link["short-link"]
        .as_str()
        .expect("short link")
        .trim_start_matches("http://testserver")
        .to_owned();
    let res =
        actix_test::call_service(&app, TestRequest::get().uri(&short_path).to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn list_filters_by_tag_author_and_membership(store: InMemoryStore) {
    let catalogue = seed(&store);
    let app = actix_test::init_service(app(&store)).await;
    let (anna, anna_id) = signed_in_user(&app, "anna").await;
    let (boris, _) = signed_in_user(&app, "boris").await;
    let porridge = create_recipe(
        &app,
        &anna,
        recipe_body("Porridge", &[(catalogue.flour, 50)], &[catalogue.breakfast]),
    )
    .await;
    let sandwich = create_recipe(
        &app,
        &boris,
        recipe_body("Sandwich", &[(catalogue.egg, 1)], &[catalogue.lunch]),
    )
    .await;
    let both = [catalogue.breakfast, catalogue.lunch];
    let brunch = create_recipe(
        &app,
        &boris,
        recipe_body("Brunch", &[(catalogue.egg, 2)], &both),
    )
    .await;
    send(
        &app,
        TestRequest::post().uri(&recipe_uri(sandwich, "favorite/")),
        Some(&anna),
    )
    .await;

    let ids = |body: &serde_json::Value| -> Vec<i64> {
        body["results"]
            .as_array()
            .expect("results")
            .iter()
            .filter_map(|r| r["id"].as_i64())
            .collect()
    };
    let list = |query: String| TestRequest::get().uri(&format!("/api/recipes/{query}"));

    let (_, body) = send(&app, list(String::new()), None).await;
    assert_eq!(body["count"], 3);
    assert_eq!(ids(&body), vec![brunch, sandwich, porridge]);

    let (_, body) = send(&app, list("?tags=breakfast".into()), None).await;
    assert_eq!(ids(&body), vec![brunch, porridge]);

    let (_, body) = send(&app, list("?tags=breakfast&tags=lunch".into()), None).await;
    assert_eq!(body["count"], 3);

    let (_, body) = send(&app, list(format!("?author={anna_id}")), None).await;
    assert_eq!(ids(&body), vec![porridge]);

    let (_, body) = send(&app, list("?is_favorited=1".into()), Some(&anna)).await;
    assert_eq!(ids(&body), vec![sandwich]);
    assert_eq!(body["results"][0]["is_favorited"], true);

    let (_, body) = send(&app, list("?is_favorited=0".into()), Some(&anna)).await;
    assert_eq!(ids(&body), vec![brunch, porridge]);

    let (status, body) = send(&app, list("?is_favorited=1".into()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[rstest]
#[actix_web::test]
async fn recipe_pages_link_to_neighbours(store: InMemoryStore) {
    let catalogue = seed(&store);
    let app = actix_test::init_service(app(&store)).await;
    let (anna, _) = signed_in_user(&app, "anna").await;
    for n in 0..3 {
        let body = recipe_body(&format!("Dish {n}"), &[(catalogue.egg, 1)], &[catalogue.lunch]);
        create_recipe(&app, &anna, body).await;
    }

    let (status, body) = send(
        &app,
        TestRequest::get().uri("/api/recipes/?limit=2&page=2"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["results"].as_array().map(Vec::len), Some(1));
    assert!(body["next"].is_null());
    assert_eq!(body["previous"], "http://testserver/api/recipes/?limit=2");

    let (status, error) = send(
        &app,
        TestRequest::get().uri("/api/recipes/?limit=2&page=3"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "not_found");
}

#[rstest]
#[actix_web::test]
async fn unknown_and_malformed_ids_are_not_found(store: InMemoryStore) {
    let app = actix_test::init_service(app(&store)).await;
    for uri in [
        "/api/recipes/42/",
        "/api/recipes/abc/",
        "/api/tags/7/",
        "/api/ingredients/x/",
    ] {
        let (status, error) = send(&app, TestRequest::get().uri(uri), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(error["code"], "not_found", "{uri}");
    }
}

#[rstest]
#[actix_web::test]
async fn catalogue_lists_tags_and_searches_ingredients(store: InMemoryStore) {
    seed(&store);
    store.add_ingredient("Egg noodles", "g");
    let app = actix_test::init_service(app(&store)).await;

    let (status, tags) = send(&app, TestRequest::get().uri("/api/tags/"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tags.as_array().map(Vec::len), Some(2));

    let (status, found) = send(
        &app,
        TestRequest::get().uri("/api/ingredients/?name=EGG"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = found
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|i| i["name"].as_str())
        .collect();
    assert_eq!(names.len(), 2, "{names:?}");
    assert!(names.contains(&"egg"));
}

#[rstest]
#[actix_web::test]
async fn every_response_carries_a_trace_id(store: InMemoryStore) {
    let app = actix_test::init_service(app(&store)).await;
    let res = actix_test::call_service(
        &app,
        TestRequest::get().uri("/api/recipes/999/").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let header_id = res
        .headers()
        .get("trace-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("trace-id header");
    let body: serde_json::Value = actix_test::read_body_json(res).await;
    assert_eq!(body["traceId"], header_id.as_str());

    let res =
        actix_test::call_service(&app, TestRequest::get().uri("/health/live").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
}
