//! Server-rendered page shells

use axum::response::Html;

pub async fn landing() -> Html<&'static str> {
    Html(
        "<!doctype html><html><head><title>Reelbox</title></head>\
         <body><h1>Reelbox</h1><p>Short videos, straight from the people you follow.</p>\
         <a href=\"/home\">Sign in</a></body></html>",
    )
}

pub async fn home() -> Html<&'static str> {
    Html(
        "<!doctype html><html><head><title>Home - Reelbox</title></head>\
         <body><h1>Your feed</h1><a href=\"/reels/upload\">Upload a reel</a></body></html>",
    )
}

pub async fn reels_feed() -> Html<&'static str> {
    Html(
        "<!doctype html><html><head><title>Reels - Reelbox</title></head>\
         <body><h1>Latest reels</h1></body></html>",
    )
}

pub async fn upload() -> Html<&'static str> {
    Html(
        "<!doctype html><html><head><title>Upload - Reelbox</title></head>\
         <body><h1>Upload a reel</h1>\
         <p>Your browser uploads directly to the video platform.</p></body></html>",
    )
}
