// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use armory_app::{Inventory, Record};
use std::thread::{self, JoinHandle};
use time::OffsetDateTime;
use tiny_http::{Header, Response, Server};

/// Well-formed two-row feed: one active record, one archived with a note.
pub const SAMPLE_FEED: &str = "\
Mfr,Model,Cal,Serial,Img,Archived,Notes
Glock,19,9mm,ABC123,,false,
Colt,1911,.45,XYZ789,,true,Traded
";

/// Feed with structural failures mixed in: a short row and a row missing
/// an identity field, between two good rows.
pub const MIXED_FEED: &str = "\
Mfr,Model,Cal,Serial,Img,Archived,Notes
Glock,19,9mm,ABC123,,false,
Glock,19,9mm
Ruger,,.22 LR,0012,,false,
Colt,1911,.45,XYZ789,https://img.example/colt.jpg,true,Traded
";

pub fn record(manufacturer: &str, model: &str, caliber: &str, serial: &str) -> Record {
    Record {
        manufacturer: manufacturer.to_owned(),
        model: model.to_owned(),
        caliber: caliber.to_owned(),
        serial_number: serial.to_owned(),
        image_url: None,
        archived: false,
        disposition: None,
    }
}

pub fn archived_record(
    manufacturer: &str,
    model: &str,
    caliber: &str,
    serial: &str,
    disposition: &str,
) -> Record {
    Record {
        manufacturer: manufacturer.to_owned(),
        model: model.to_owned(),
        caliber: caliber.to_owned(),
        serial_number: serial.to_owned(),
        image_url: None,
        archived: true,
        disposition: Some(disposition.to_owned()),
    }
}

pub fn with_image(mut record: Record, image_url: &str) -> Record {
    record.image_url = Some(image_url.to_owned());
    record
}

/// Small inventory matching `SAMPLE_FEED` plus one extra active record
/// with an image, for view-layer tests.
pub fn sample_inventory() -> Inventory {
    Inventory::loaded(
        vec![
            record("Glock", "19", "9mm", "ABC123"),
            with_image(
                record("Ruger", "10/22", ".22 LR", "0012-34567"),
                "https://img.example/ruger.jpg",
            ),
            archived_record("Colt", "1911", ".45", "XYZ789", "Traded"),
        ],
        0,
        OffsetDateTime::UNIX_EPOCH,
    )
}

/// One-shot mock feed server: answers `requests` GETs with `status` and
/// `body`, then lets its thread finish. Returns the URL to fetch.
pub fn spawn_feed_server(
    body: &str,
    status: u16,
    requests: usize,
) -> Result<(String, JoinHandle<()>)> {
    let server = Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let url = format!("http://{}/feed.csv", server.server_addr());
    let body = body.to_owned();

    let handle = thread::spawn(move || {
        for _ in 0..requests {
            let request = server.recv().expect("request expected");
            let response = Response::from_string(body.clone())
                .with_status_code(status)
                .with_header(
                    Header::from_bytes("Content-Type", "text/csv")
                        .expect("valid content type header"),
                );
            request.respond(response).expect("response should succeed");
        }
    });

    Ok((url, handle))
}
