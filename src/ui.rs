use autoclave_calc::import::load_detections;
use autoclave_calc::store::{load_profile, open_store, save_profile, StoreResult};
use autoclave_calc::valuation::format_currency;
use autoclave_calc::{
    CalculationReport, ItemKind, PriceUnit, Profile, MAX_ITERATIONS, MAX_QUANTITY,
};
use eframe::egui;
use egui::{Color32, Context, FontFamily, FontId, Margin, RichText, Stroke, Vec2, Visuals};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Plot};
use std::path::PathBuf;
use tracing::error;

const ACCENT: Color32 = Color32::from_rgb(120, 210, 220);
const HEADER: Color32 = Color32::from_rgb(170, 200, 210);
const GAIN: Color32 = Color32::from_rgb(100, 255, 150);
const LOSS: Color32 = Color32::from_rgb(255, 110, 110);

pub fn set_custom_style(ctx: &Context) {
    // Steel-and-teal clinic palette
    let mut visuals = Visuals::dark();

    visuals.panel_fill = Color32::from_rgb(14, 20, 24);
    visuals.window_fill = Color32::from_rgb(20, 28, 33);
    visuals.extreme_bg_color = Color32::from_rgb(26, 36, 42);
    visuals.faint_bg_color = Color32::from_rgb(22, 31, 36);

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(30, 42, 48);
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, Color32::from_rgb(55, 80, 90));

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(40, 58, 66);
    visuals.widgets.hovered.bg_stroke = Stroke::new(2.0, Color32::from_rgb(90, 170, 185));

    visuals.widgets.active.bg_fill = Color32::from_rgb(50, 72, 82);
    visuals.widgets.active.bg_stroke = Stroke::new(2.0, ACCENT);

    visuals.selection.bg_fill = Color32::from_rgb(45, 95, 105);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.window_margin = Margin::same(12);
    style.spacing.button_padding = egui::vec2(12.0, 6.0);

    style.text_styles.insert(
        egui::TextStyle::Body,
        FontId::new(15.0, FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Heading,
        FontId::new(20.0, FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Button,
        FontId::new(15.0, FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Monospace,
        FontId::new(14.0, FontFamily::Monospace),
    );

    ctx.set_style(style);
}

pub struct AutoclaveApp {
    db_path: PathBuf,
    profile: Profile,
    report: CalculationReport,

    import_path: String,
    auto_recalculate: bool,
    status: Option<(String, bool)>,
}

impl AutoclaveApp {
    pub fn new(db_path: PathBuf, profile: Profile) -> Self {
        let report = profile.calculate();
        Self {
            db_path,
            profile,
            report,
            import_path: "detections.json".into(),
            auto_recalculate: true,
            status: None,
        }
    }

    fn recalculate(&mut self) {
        self.report = self.profile.calculate();
    }

    fn save(&mut self) {
        let result: StoreResult<()> =
            open_store(&self.db_path).and_then(|mut conn| save_profile(&mut conn, &self.profile));
        match result {
            Ok(()) => self.set_status(format!("Saved to {}", self.db_path.display()), false),
            Err(e) => {
                error!(error = %e, "saving profile failed");
                self.set_status(format!("Save failed: {e}"), true);
            }
        }
    }

    fn reload(&mut self) {
        match open_store(&self.db_path).and_then(|conn| load_profile(&conn)) {
            Ok(profile) => {
                self.profile = profile;
                self.recalculate();
                self.set_status(format!("Loaded {}", self.db_path.display()), false);
            }
            Err(e) => {
                error!(error = %e, "loading profile failed");
                self.set_status(format!("Load failed: {e}"), true);
            }
        }
    }

    fn import(&mut self) {
        match load_detections(self.import_path.trim()) {
            Ok(detected) => {
                self.profile.merge_detected(&detected);
                self.recalculate();
                self.set_status(format!("Imported {} detected items", detected.len()), false);
            }
            Err(e) => {
                error!(error = %e, path = %self.import_path, "import failed");
                self.set_status(format!("Import failed: {e}"), true);
            }
        }
    }

    fn set_status(&mut self, message: String, is_error: bool) {
        self.status = Some((message, is_error));
    }

    fn inputs_table(&mut self, ui: &mut egui::Ui) -> bool {
        let profile = &mut self.profile;
        let mut changed = false;

        TableBuilder::new(ui)
            .striped(true)
            .vscroll(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::remainder().at_least(110.0).clip(true)) // Item
            .column(Column::exact(80.0)) // Quantity
            .column(Column::exact(70.0)) // Reserve
            .column(Column::exact(44.0)) // Auto-repeat
            .column(Column::exact(80.0)) // Price
            .column(Column::exact(130.0)) // Unit
            .header(28.0, |mut header| {
                for title in ["Item", "Qty", "Keep", "Auto", "Price", "Unit"] {
                    header.col(|ui| {
                        ui.strong(RichText::new(title).color(HEADER));
                    });
                }
            })
            .body(|body| {
                body.rows(30.0, ItemKind::ALL.len(), |mut row| {
                    let kind = ItemKind::ALL[row.index()];

                    row.col(|ui| {
                        ui.label(kind.display_name());
                    });

                    row.col(|ui| {
                        let mut qty = profile.quantity(kind) as i64;
                        if ui.add(egui::DragValue::new(&mut qty).range(0..=MAX_QUANTITY as i64)).changed() {
                            profile.set_quantity(kind, qty);
                            changed = true;
                        }
                    });

                    row.col(|ui| {
                        let mut reserve = profile.min_reserve(kind) as i64;
                        if ui
                            .add(egui::DragValue::new(&mut reserve).range(0..=MAX_QUANTITY as i64))
                            .on_hover_text("Never convert below this amount")
                            .changed()
                        {
                            profile.set_min_reserve(kind, reserve);
                            changed = true;
                        }
                    });

                    row.col(|ui| {
                        let mut auto = profile.auto_repeat(kind);
                        if ui
                            .checkbox(&mut auto, "")
                            .on_hover_text("Keep converting outputs after the first pass")
                            .changed()
                        {
                            profile.set_auto_repeat(kind, auto);
                            changed = true;
                        }
                    });

                    let spec = profile.price(kind);
                    let mut value = spec.value;
                    let mut unit = spec.unit;

                    row.col(|ui| {
                        if ui
                            .add(egui::DragValue::new(&mut value).range(0.0..=f64::MAX).speed(0.1))
                            .changed()
                        {
                            changed = true;
                        }
                    });

                    row.col(|ui| {
                        egui::ComboBox::from_id_salt(("unit", kind.index()))
                            .selected_text(unit.label())
                            .show_ui(ui, |ui| {
                                for u in PriceUnit::ALL {
                                    if ui.selectable_value(&mut unit, u, u.label()).clicked() {
                                        changed = true;
                                    }
                                }
                            });
                    });

                    if value != spec.value || unit != spec.unit {
                        profile.set_price(kind, value, unit);
                    }
                });
            });

        changed
    }

    fn value_banner(&self, ui: &mut egui::Ui) {
        let v = &self.report.value;
        let (headline, color) = if v.is_profitable {
            ("▲ Profitable", GAIN)
        } else if v.difference < 0.0 {
            ("▼ Loss", LOSS)
        } else {
            ("● No change", Color32::LIGHT_GRAY)
        };

        egui::Frame::new()
            .fill(Color32::from_rgb(20, 30, 36))
            .stroke(Stroke::new(2.0, Color32::from_rgb(50, 80, 90)))
            .inner_margin(Margin::same(12))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(headline).color(color).strong().size(18.0));
                    ui.separator();
                    ui.label(format!("Before: {}", format_currency(v.before_value)));
                    ui.label(format!("After: {}", format_currency(v.after_value)));
                    ui.label(
                        RichText::new(format!(
                            "Δ {} ({:+.1}%)",
                            format_currency(v.difference),
                            v.profit_percent
                        ))
                        .color(color)
                        .strong(),
                    );
                    ui.separator();
                    ui.label(format!(
                        "{} of {} items priced",
                        self.profile.prices.priced_count(),
                        ItemKind::ALL.len()
                    ));
                    ui.label(format!(
                        "{} operations over {} passes",
                        self.report.total_operations(),
                        self.report.iterations.len()
                    ));
                });
                if self.report.capped {
                    ui.label(
                        RichText::new(format!(
                            "⚠ Stopped at the {MAX_ITERATIONS}-pass limit; results show the state at that point"
                        ))
                        .color(Color32::from_rgb(255, 200, 90)),
                    );
                }
            });
    }

    fn results_table(&self, ui: &mut egui::Ui) {
        let summaries = &self.report.summaries;
        let breakdown = &self.report.breakdown;

        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::remainder().at_least(120.0).clip(true)) // Item
            .column(Column::exact(90.0)) // Before
            .column(Column::exact(90.0)) // Consumed
            .column(Column::exact(90.0)) // Received
            .column(Column::exact(90.0)) // After
            .column(Column::exact(100.0)) // Unit value
            .column(Column::exact(110.0)) // Value before
            .column(Column::exact(110.0)) // Value after
            .column(Column::exact(110.0)) // Difference
            .header(28.0, |mut header| {
                for title in [
                    "Item", "Before", "Used", "Gained", "After", "Each", "Value Before",
                    "Value After", "Δ Value",
                ] {
                    header.col(|ui| {
                        ui.strong(RichText::new(title).color(HEADER));
                    });
                }
            })
            .body(|body| {
                body.rows(26.0, summaries.len(), |mut row| {
                    let i = row.index();
                    let s = &summaries[i];
                    let b = &breakdown[i];

                    row.col(|ui| {
                        ui.label(s.kind.display_name());
                    });
                    row.col(|ui| {
                        ui.label(s.original_quantity.to_string());
                    });
                    row.col(|ui| {
                        ui.label(RichText::new(s.total_consumed.to_string()).color(LOSS));
                    });
                    row.col(|ui| {
                        ui.label(RichText::new(s.total_received.to_string()).color(GAIN));
                    });
                    row.col(|ui| {
                        ui.label(RichText::new(s.final_quantity.to_string()).strong());
                    });
                    row.col(|ui| {
                        ui.label(format_currency(b.per_item_value));
                    });
                    row.col(|ui| {
                        ui.label(format_currency(b.before_value));
                    });
                    row.col(|ui| {
                        ui.label(format_currency(b.after_value));
                    });
                    row.col(|ui| {
                        let color = if b.difference > 0.0 {
                            GAIN
                        } else if b.difference < 0.0 {
                            LOSS
                        } else {
                            Color32::LIGHT_GRAY
                        };
                        ui.label(RichText::new(format_currency(b.difference)).color(color));
                    });
                });
            });
    }

    fn iteration_chart(&self, ui: &mut egui::Ui) {
        let bars: Vec<Bar> = self
            .report
            .iterations
            .iter()
            .map(|r| Bar::new(r.iteration as f64, r.total_operations as f64).width(0.8))
            .collect();

        Plot::new("operations_per_pass")
            .height(180.0)
            .allow_scroll(false)
            .x_axis_label("Pass")
            .y_axis_label("Operations")
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new("Operations", bars).color(ACCENT));
            });
    }
}

impl eframe::App for AutoclaveApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.heading(RichText::new("✚ Autoclave Calculator").color(ACCENT).strong());
            ui.add_space(4.0);
            ui.separator();

            ui.horizontal(|ui| {
                if ui
                    .add_sized(
                        Vec2::new(110.0, 30.0),
                        egui::Button::new(RichText::new("⟳ Calculate").color(ACCENT).strong()),
                    )
                    .clicked()
                {
                    self.recalculate();
                }
                ui.checkbox(&mut self.auto_recalculate, "Live");

                ui.separator();

                if ui.button("💾 Save").clicked() {
                    self.save();
                }
                if ui.button("📂 Reload").clicked() {
                    self.reload();
                }
                if ui.button("🗑 Clear quantities").clicked() {
                    self.profile.clear_quantities();
                    self.recalculate();
                }

                ui.separator();

                ui.add(
                    egui::TextEdit::singleline(&mut self.import_path)
                        .hint_text("detections.json")
                        .desired_width(200.0),
                );
                if ui.button("📥 Import detections").clicked() {
                    self.import();
                }
            });

            if let Some((message, is_error)) = &self.status {
                let color = if *is_error { LOSS } else { Color32::from_rgb(170, 190, 200) };
                ui.label(RichText::new(message).color(color).italics());
            }
            ui.add_space(2.0);
        });

        egui::SidePanel::left("inputs")
            .min_width(520.0)
            .show(ctx, |ui| {
                ui.heading(RichText::new("Inventory & Prices").color(ACCENT));
                ui.separator();
                let changed = ui.push_id("inputs_table", |ui| self.inputs_table(ui)).inner;
                if changed && self.auto_recalculate {
                    self.recalculate();
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.value_banner(ui);
            ui.add_space(8.0);

            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.push_id("results_table", |ui| self.results_table(ui));
                ui.add_space(10.0);
                ui.separator();
                ui.label(RichText::new("Operations per pass").strong().color(HEADER));
                if self.report.iterations.is_empty() {
                    ui.label(
                        RichText::new("Nothing to convert: every item is below 20 above its reserve")
                            .color(Color32::GRAY),
                    );
                } else {
                    self.iteration_chart(ui);
                }
            });
        });
    }
}
