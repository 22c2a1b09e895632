//! Shared fixtures: generated PDFs and local mock HTTP services.

#![allow(dead_code)]

use axum::Router;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use tokio::net::TcpListener;

/// An image XObject placed on a test page.
pub struct TestImage {
    pub filter: Option<&'static str>,
    pub color_space: &'static str,
    pub width: i64,
    pub height: i64,
    pub data: Vec<u8>,
}

impl TestImage {
    /// Bytes labelled as a JPEG stream; passed through untouched.
    pub fn jpeg(data: &[u8]) -> Self {
        Self {
            filter: Some("DCTDecode"),
            color_space: "DeviceRGB",
            width: 1,
            height: 1,
            data: data.to_vec(),
        }
    }

    /// Uncompressed 8-bit RGB samples.
    pub fn raw_rgb(width: i64, height: i64) -> Self {
        Self {
            filter: None,
            color_space: "DeviceRGB",
            width,
            height,
            data: vec![200; (width * height * 3) as usize],
        }
    }

    /// A Flate stream whose payload cannot be inflated.
    pub fn broken_flate() -> Self {
        Self {
            filter: Some("FlateDecode"),
            color_space: "DeviceRGB",
            width: 2,
            height: 2,
            data: b"this is not zlib data".to_vec(),
        }
    }
}

/// A page of a generated PDF.
#[derive(Default)]
pub struct TestPage {
    pub text: Option<&'static str>,
    pub images: Vec<TestImage>,
}

impl TestPage {
    pub fn text(text: &'static str) -> Self {
        Self {
            text: Some(text),
            images: Vec::new(),
        }
    }

    pub fn blank() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, image: TestImage) -> Self {
        self.images.push(image);
        self
    }
}

/// Build a PDF with one Courier text line per page and the given images.
pub fn build_pdf(pages: Vec<TestPage>, title: Option<&str>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in &pages {
        let mut operations = Vec::new();
        if let Some(text) = page.text {
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ]);
        }

        let mut xobjects = Dictionary::new();
        for (idx, image) in page.images.iter().enumerate() {
            let mut dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width,
                "Height" => image.height,
                "ColorSpace" => image.color_space,
                "BitsPerComponent" => 8,
            };
            if let Some(filter) = image.filter {
                dict.set("Filter", Object::Name(filter.as_bytes().to_vec()));
            }
            let image_id = doc.add_object(Stream::new(dict, image.data.clone()));
            let name = format!("Im{}", idx);
            xobjects.set(name.as_bytes().to_vec(), Object::Reference(image_id));
            operations.extend([
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![100.into(), 0.into(), 0.into(), 100.into(), 72.into(), 72.into()],
                ),
                Operation::new("Do", vec![Object::Name(name.into_bytes())]),
                Operation::new("Q", vec![]),
            ]);
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("content encodes"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => xobjects,
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Author" => Object::string_literal("Docmill Tests"),
        });
        doc.trailer.set("Info", info_id);
    }

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("pdf saves");
    buf
}

/// Bind a listener on an ephemeral local port and return it with its base URL.
pub async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    (listener, base)
}

/// Serve `router` on `listener` in the background.
pub fn spawn(listener: TcpListener, router: Router) {
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
}
